use clap::{Subcommand, ValueEnum};

#[derive(Subcommand)]
pub enum Commands {
    /// Print the filter, projection and sort sent for one window
    Plan {
        #[arg(long, help = "Base filter as extended JSON", default_value = "{}")]
        query: String,

        #[arg(long, help = "Base projection as extended JSON")]
        fields: Option<String>,

        #[arg(long, help = "Sort, e.g. \"lastName,age:desc\"", default_value = "")]
        sort: String,

        #[arg(long, help = "Window size; defaults to the configured page size")]
        size: Option<usize>,

        #[arg(long, help = "Keyset of the last seen document as extended JSON")]
        keys: Option<String>,

        #[arg(long, help = "Plan an offset window starting at this position", conflicts_with = "keys")]
        offset: Option<u64>,

        #[arg(long, help = "Unique field used as the final sort key")]
        id_field: Option<String>,
    },
    /// Page through a JSON array of documents and print every window
    Page {
        #[arg(long, help = "File holding a JSON array of documents")]
        data: String,

        #[arg(long, help = "Base filter as extended JSON", default_value = "{}")]
        filter: String,

        #[arg(long, help = "Base projection as extended JSON")]
        fields: Option<String>,

        #[arg(long, help = "Sort, e.g. \"lastName,age:desc\"", default_value = "")]
        sort: String,

        #[arg(long, help = "Window size; defaults to the configured page size")]
        size: Option<usize>,

        #[arg(long, value_enum, default_value_t = Mode::Keyset)]
        mode: Mode,

        #[arg(long, help = "Stop after this many windows")]
        max_pages: Option<usize>,

        #[arg(long, help = "Unique field used as the final sort key")]
        id_field: Option<String>,

        #[arg(
            long,
            help = "If specified, writes the windows to this file instead of stdout"
        )]
        output: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Keyset,
    Offset,
}
