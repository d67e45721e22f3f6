use clap::Parser;

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    #[clap(value_parser, help = "The API descriptor file or URL")]
    pub input: String,

    #[clap(
        long,
        value_parser,
        help = "Descriptor file or URL of the file-interchange add-on surface"
    )]
    pub interchange: Option<String>,

    #[clap(
        long,
        default_value = "graphs",
        value_parser,
        help = "Namespace prefix the interchange surface is remapped under"
    )]
    pub interchange_prefix: String,
}
