//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No collection logic lives here.
//!
//! Positions given on the command line are 1-based.

use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "roundhouse",
    bin_name = "roundhouse",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Model railway collection manager",
    long_about = "RoundHouse records the models you buy, the trains you build \
                  from them and the DCC decoders you fit.",
    after_help = "EXAMPLES:\n\
        \x20 roundhouse purchase add Bachmann 32-381A --date 2019-05-04\n\
        \x20 roundhouse purchase similar --manufacturer Bachmann --catalog-number 32-381\n\
        \x20 roundhouse train create \"Cornish Riviera\" --number 1A79\n\
        \x20 roundhouse completions bash > /usr/share/bash-completion/completions/roundhouse",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record and look up purchases.
    #[command(
        visible_alias = "p",
        subcommand,
        about = "Record and look up purchases",
        after_help = "EXAMPLES:\n\
            \x20 roundhouse purchase add Hornby R3174 --price 189.99 --condition new\n\
            \x20 roundhouse purchase list --manufacturer Hornby\n\
            \x20 roundhouse purchase similar 3f2a"
    )]
    Purchase(PurchaseCommands),

    /// Models within a purchase.
    #[command(
        visible_alias = "m",
        subcommand,
        about = "Manage the models in a purchase",
        after_help = "EXAMPLES:\n\
            \x20 roundhouse model add 3f2a --class \"Class 47\" --number \"47 401\"\n\
            \x20 roundhouse model move 3f2a 9c1d 1"
    )]
    Model(ModelCommands),

    /// Trains and their members.
    #[command(
        visible_alias = "t",
        subcommand,
        about = "Build trains",
        after_help = "EXAMPLES:\n\
            \x20 roundhouse train create \"Night Riviera\"\n\
            \x20 roundhouse train add-member 51be \"Class 57\" \"57 602\" --position 1"
    )]
    Train(TrainCommands),

    /// Decoder stock.
    #[command(
        visible_alias = "d",
        subcommand,
        about = "Track DCC decoders",
        after_help = "EXAMPLES:\n\
            \x20 roundhouse decoder add-type ESU 58429 --family \"LokSound 5\" --minimum-stock 2\n\
            \x20 roundhouse decoder stock"
    )]
    Decoder(DecoderCommands),

    /// Initialise a RoundHouse configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 roundhouse init            # default location\n\
            \x20 roundhouse -c ./rh.toml init"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 roundhouse completions bash > ~/.local/share/bash-completion/completions/roundhouse\n\
            \x20 roundhouse completions zsh  > ~/.zfunc/_roundhouse\n\
            \x20 roundhouse completions fish > ~/.config/fish/completions/roundhouse.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the RoundHouse configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 roundhouse config get ordering.baseline\n\
            \x20 roundhouse config list"
    )]
    Config(ConfigCommands),
}

// ── purchase ──────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum PurchaseCommands {
    /// Record a new purchase and show earlier similar ones.
    Add(PurchaseAddArgs),
    /// List purchases.
    #[command(visible_alias = "ls")]
    List {
        /// Only purchases from this manufacturer (exact match).
        #[arg(short = 'm', long = "manufacturer")]
        manufacturer: Option<String>,
    },
    /// Show one purchase and its models.
    Show {
        /// Purchase id or unique id prefix.
        purchase: String,
    },
    /// Find earlier purchases with a related catalog number.
    Similar(SimilarArgs),
    /// Remove a purchase and its models.
    #[command(visible_alias = "rm")]
    Remove {
        /// Purchase id or unique id prefix.
        purchase: String,
    },
}

/// Arguments for `roundhouse purchase add`.
#[derive(Debug, Args)]
pub struct PurchaseAddArgs {
    /// Manufacturer, e.g. `Bachmann`.
    pub manufacturer: String,

    /// Catalog number, e.g. `32-381A`.
    pub catalog_number: String,

    #[arg(short = 'd', long = "description", help = "Catalog description")]
    pub description: Option<String>,

    #[arg(long = "date", value_name = "YYYY-MM-DD", help = "Purchase date")]
    pub date: Option<NaiveDate>,

    #[arg(long = "shop", value_name = "NAME", help = "Where it was bought")]
    pub shop: Option<String>,

    #[arg(long = "price", help = "Price paid")]
    pub price: Option<f64>,

    /// Condition: new, like-new, used, used-in-wrong-box, handmade.
    #[arg(long = "condition")]
    pub condition: Option<String>,

    #[arg(long = "catalog-year", value_name = "YEAR")]
    pub catalog_year: Option<i32>,

    #[arg(long = "notes")]
    pub notes: Option<String>,
}

/// Arguments for `roundhouse purchase similar`.
#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("candidate")
        .required(true)
        .args(["purchase", "manufacturer"])
))]
pub struct SimilarArgs {
    /// A stored purchase to match against.
    pub purchase: Option<String>,

    /// Match a purchase that is not recorded yet.
    #[arg(short = 'm', long = "manufacturer", requires = "catalog_number")]
    pub manufacturer: Option<String>,

    #[arg(long = "catalog-number", requires = "manufacturer")]
    pub catalog_number: Option<String>,
}

// ── model ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ModelCommands {
    /// Add a model to a purchase.
    Add(ModelAddArgs),
    /// List the models in a purchase, in order.
    #[command(visible_alias = "ls")]
    List {
        /// Purchase id or unique id prefix.
        purchase: String,
    },
    /// Move a model to a new position.
    #[command(visible_alias = "mv")]
    Move {
        purchase: String,
        model: String,
        /// New 1-based position.
        position: usize,
    },
    /// Remove a model from a purchase.
    #[command(visible_alias = "rm")]
    Remove { purchase: String, model: String },
}

/// Arguments for `roundhouse model add`.
#[derive(Debug, Args)]
pub struct ModelAddArgs {
    /// Purchase id or unique id prefix.
    pub purchase: String,

    #[arg(long = "class", value_name = "CLASS", help = "Model class, e.g. \"Class 47\"")]
    pub model_class: String,

    #[arg(long = "number", help = "Running number")]
    pub number: Option<String>,

    #[arg(long = "name", help = "Locomotive name")]
    pub name: Option<String>,

    #[arg(long = "livery")]
    pub livery: Option<String>,

    /// Era, by number (1-11) or name.
    #[arg(long = "era")]
    pub era: Option<String>,

    /// e.g. "diesel electric locomotive", "coach", "wagon".
    #[arg(long = "classification")]
    pub classification: Option<String>,

    /// analog, dcc-ready, dcc-fitted or dcc-sound.
    #[arg(long = "dispatch")]
    pub dispatch: Option<String>,

    /// 1-based position; appends when omitted.
    #[arg(long = "position")]
    pub position: Option<usize>,
}

// ── train ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum TrainCommands {
    /// Create an empty train.
    Create {
        name: String,
        /// Headcode or train number.
        #[arg(long = "number")]
        number: Option<String>,
    },
    /// List trains.
    #[command(visible_alias = "ls")]
    List,
    /// Show a train's members in order.
    Show { train: String },
    /// Rename a train.
    Rename { train: String, name: String },
    /// Add a member to a train.
    AddMember(AddMemberArgs),
    /// Move a member to a new position.
    MoveMember {
        train: String,
        member: String,
        /// New 1-based position.
        position: usize,
    },
    /// Remove a member from a train.
    RemoveMember { train: String, member: String },
    /// Turn a member round.
    FlipMember { train: String, member: String },
    /// Remove a train.
    #[command(visible_alias = "rm")]
    Remove { train: String },
}

/// Arguments for `roundhouse train add-member`.
#[derive(Debug, Args)]
pub struct AddMemberArgs {
    /// Train id or unique id prefix.
    pub train: String,

    /// Model class, e.g. "Mk1 BSK".
    pub model_class: String,

    /// Running number or name.
    pub number_or_name: String,

    #[arg(long = "title")]
    pub title: Option<String>,

    #[arg(long = "flipped", help = "Member runs reversed")]
    pub flipped: bool,

    /// 1-based position; appends when omitted.
    #[arg(long = "position")]
    pub position: Option<usize>,
}

// ── decoder ───────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum DecoderCommands {
    /// Add a decoder product type.
    AddType(AddTypeArgs),
    /// Add a decoder of a known type.
    Add(AddDecoderArgs),
    /// List decoders, or decoder types with `--types`.
    #[command(visible_alias = "ls")]
    List {
        #[arg(long = "types")]
        types: bool,
    },
    /// Fit a decoder to a model.
    Fit {
        decoder: String,
        purchase: String,
        model: String,
    },
    /// Take the decoder out of a model.
    Unfit { purchase: String, model: String },
    /// Remove a spare decoder.
    #[command(visible_alias = "rm")]
    Remove { decoder: String },
    /// Spare decoders per type against the wanted minimum.
    Stock {
        /// Only types below their minimum.
        #[arg(long = "low")]
        low: bool,
    },
}

/// Arguments for `roundhouse decoder add-type`.
#[derive(Debug, Args)]
pub struct AddTypeArgs {
    pub manufacturer: String,
    pub product_code: String,

    #[arg(long = "family")]
    pub family: Option<String>,

    #[arg(long = "description")]
    pub description: Option<String>,

    #[arg(long = "socket", help = "Interface, e.g. Next18, 21MTC")]
    pub socket: Option<String>,

    #[arg(long = "sound")]
    pub sound: bool,

    #[arg(long = "railcom")]
    pub railcom: bool,

    #[arg(long = "minimum-stock", default_value_t = 0)]
    pub minimum_stock: u32,
}

/// Arguments for `roundhouse decoder add`.
#[derive(Debug, Args)]
pub struct AddDecoderArgs {
    /// Decoder type id or unique id prefix.
    pub decoder_type: String,

    #[arg(long = "serial")]
    pub serial_number: Option<String>,

    #[arg(long = "address", help = "DCC address (1-10239)")]
    pub address: Option<u16>,

    #[arg(long = "firmware")]
    pub firmware_version: Option<String>,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `roundhouse init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `roundhouse completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `roundhouse config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `ordering.baseline`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
