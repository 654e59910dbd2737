use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "untmod")]
#[command(version)]
#[command(about = "List and extract TMOD mod-package archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  untmod -l Example.tmod         list the entries in Example.tmod\n  \
  untmod Example.tmod Info       extract only the Info entry\n  \
  untmod --main Example.tmod     extract the mod's main assembly")]
pub struct Cli {
    /// TMOD archive path
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Entries to extract (default: all)
    #[arg(value_name = "ENTRIES")]
    pub entries: Vec<String>,

    /// List entries (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely/show mod info
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract entries to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract entries into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Extract the main assembly ({mod name}.dll) only
    #[arg(long = "main")]
    pub main_assembly: bool,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }
}
