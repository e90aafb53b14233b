use gumdrop::Options;

#[derive(Debug, Default, Options)]
pub struct CliStart {
    #[options(help_flag, help = "print help message")]
    pub help: bool,
    #[options(no_short, help = "show program version number")]
    pub version: bool,
    #[options(
        short = "v",
        help = "show the full report instead of warnings only"
    )]
    pub verbose: bool,
    #[options(no_short, long = "nocolour", help = "disable colour in the output")]
    pub nocolour: bool,
}
