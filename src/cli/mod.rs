//! CLI argument definitions for Shopkeep.

use clap::{Args, Parser, Subcommand};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SHOP_GIT_COMMIT"),
    " ",
    env!("SHOP_BUILD_TIMESTAMP"),
    ")"
);

/// Shopkeep - storefront catalog, checkout and back-office.
///
/// Start with `shop init`, then `shop product list` to see the demo catalog.
#[derive(Parser, Debug)]
#[command(name = "shop")]
#[command(author, version = VERSION, about = "Storefront catalog, checkout and back-office CLI", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Run as if shop was started in <path> instead of the current directory.
    /// The path must exist. Can also be set via SHOP_DIR environment variable.
    #[arg(short = 'C', long = "shop", global = true, env = "SHOP_DIR")]
    pub shop_path: Option<std::path::PathBuf>,

    /// Use throwaway in-memory storage seeded with demo data
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Increase diagnostic logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize storage for this shop directory
    Init {
        /// Storage backend: file (default) or sqlite
        #[arg(long)]
        backend: Option<String>,
    },

    /// Product catalog commands
    Product {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// Order management commands
    Order {
        #[command(subcommand)]
        command: OrderCommands,
    },

    /// Customer management commands
    Customer {
        #[command(subcommand)]
        command: CustomerCommands,
    },

    /// Shopping cart commands
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },

    /// Checkout commands (place an order, save or resume a checkout, confirm payment)
    Checkout {
        #[command(subcommand)]
        command: CheckoutCommands,
    },

    /// Import products from an HTML page or a marketplace URL
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },

    /// Admin login and credentials
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Site settings (requires admin login)
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Dashboard counts and revenue (requires admin login)
    Stats,

    /// Show recent entries from the action log
    Log {
        /// Maximum number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Raw key inspection
    Kv {
        #[command(subcommand)]
        command: KvCommands,
    },
}

/// Product fields shared by `add` and `update`
#[derive(Args, Debug, Clone, Default)]
pub struct ProductFields {
    /// Image URL or path
    #[arg(long)]
    pub image: Option<String>,

    /// Long description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Page the product was taken from
    #[arg(long)]
    pub source_url: Option<String>,

    /// Category (cameras, bags, accessories, new)
    #[arg(short, long)]
    pub category: Option<String>,
}

/// Product subcommands
#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List products
    List {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show a product
    Show {
        /// Product ID
        id: String,
    },

    /// Add a product
    Add {
        /// Product name
        name: String,

        /// Price
        #[arg(short, long)]
        price: f64,

        #[command(flatten)]
        fields: ProductFields,
    },

    /// Update a product's fields
    Update {
        /// Product ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New price
        #[arg(short, long)]
        price: Option<f64>,

        #[command(flatten)]
        fields: ProductFields,
    },

    /// Delete a product
    Delete {
        /// Product ID
        id: String,
    },

    /// Search name, description and category
    Search {
        /// Search text (case-insensitive)
        query: String,
    },

    /// Edit many products at once
    Bulk {
        #[command(subcommand)]
        command: BulkCommands,
    },
}

/// Bulk product subcommands
#[derive(Subcommand, Debug)]
pub enum BulkCommands {
    /// Change prices: set, increase or decrease by an amount or percentage
    Price {
        /// Operation: set, increase, decrease
        op: String,

        /// Amount (or percentage with --percent)
        amount: f64,

        /// Treat the amount as a percentage of the current price
        #[arg(long)]
        percent: bool,

        /// Product IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Move products to a category
    Category {
        /// Target category
        category: String,

        /// Product IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Delete products
    Delete {
        /// Product IDs
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
}

/// Order subcommands
#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// List orders
    List {
        /// Filter by status (pending, processing, shipped, delivered, cancelled)
        #[arg(short, long)]
        status: Option<String>,

        /// Match order ID, customer name or email
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Show an order
    Show {
        /// Order ID
        id: String,
    },

    /// Change an order's status
    Update {
        /// Order ID
        id: String,

        /// Fulfilment status
        #[arg(short, long)]
        status: Option<String>,

        /// Payment status (pending, paid, failed, refunded)
        #[arg(short, long)]
        payment: Option<String>,
    },

    /// Delete an order
    Delete {
        /// Order ID
        id: String,
    },
}

/// Customer contact fields shared by `add` and `update`
#[derive(Args, Debug, Clone, Default)]
pub struct CustomerFields {
    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub postal_code: Option<String>,

    #[arg(long)]
    pub country: Option<String>,
}

/// Customer subcommands
#[derive(Subcommand, Debug)]
pub enum CustomerCommands {
    /// List customers
    List,

    /// Show a customer
    Show {
        /// Customer ID
        id: String,
    },

    /// Show a customer's orders and spend
    Summary {
        /// Customer ID
        id: String,
    },

    /// Add a customer (returns the existing one if the email is taken)
    Add {
        /// Full name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: String,

        #[command(flatten)]
        fields: CustomerFields,
    },

    /// Update a customer's contact details
    Update {
        /// Customer ID
        id: String,

        /// Full name
        #[arg(long)]
        name: Option<String>,

        /// Email address
        #[arg(long)]
        email: Option<String>,

        #[command(flatten)]
        fields: CustomerFields,
    },

    /// Delete a customer and all of their orders
    Delete {
        /// Customer ID
        id: String,
    },

    /// Search name, email, phone and city
    Search {
        /// Search text (case-insensitive)
        query: String,
    },
}

/// Cart subcommands
#[derive(Subcommand, Debug)]
pub enum CartCommands {
    /// Show the cart
    Show,

    /// Add a product to the cart
    Add {
        /// Product ID
        id: String,

        /// Quantity to add
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },

    /// Set a line's quantity (0 removes it)
    Set {
        /// Product ID
        id: String,

        /// New quantity
        quantity: u32,
    },

    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: String,
    },

    /// Empty the cart
    Clear,
}

/// Shipping form fields
#[derive(Args, Debug, Clone, Default)]
pub struct ShippingArgs {
    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub postal_code: Option<String>,

    #[arg(long)]
    pub country: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub email: Option<String>,
}

/// Checkout subcommands
#[derive(Subcommand, Debug)]
pub enum CheckoutCommands {
    /// Place an order for the cart and print the payment URL
    Place {
        #[command(flatten)]
        shipping: ShippingArgs,

        /// Fill missing fields (and an empty cart) from the saved checkout
        #[arg(long)]
        resume: bool,

        /// Storefront origin the payment widget redirects back to
        #[arg(long)]
        storefront_url: Option<String>,
    },

    /// Save the cart and a partly filled shipping form
    Save {
        #[command(flatten)]
        shipping: ShippingArgs,
    },

    /// Show the saved checkout
    Saved,

    /// Forget the saved checkout
    Discard,

    /// Mark the last checkout's order as paid
    Confirm,
}

/// Options shared by the import subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct ImportArgs {
    /// Category for the imported products
    #[arg(short, long)]
    pub category: Option<String>,

    /// Import only these candidates (temp IDs or 1-based positions)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// List what would be imported without storing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Import subcommands
#[derive(Subcommand, Debug)]
pub enum ImportCommands {
    /// Extract products from an HTML page (file path, URL, or - for stdin)
    Html {
        /// Where to read the page from
        source: String,

        #[command(flatten)]
        args: ImportArgs,
    },

    /// Generate products from a marketplace profile or listing URL
    Url {
        /// Profile or listing URL
        url: String,

        #[command(flatten)]
        args: ImportArgs,
    },
}

/// Admin subcommands
#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Log in to the back-office
    Login {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Log out
    Logout,

    /// Show whether you are logged in
    Status,

    /// Change the admin username and password (requires login)
    SetCredentials {
        /// New username
        #[arg(short, long)]
        username: String,

        /// New password; the current one is kept when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// Site settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show all settings
    Show,

    /// Set one setting by path (e.g. siteName, seo.metaTitle, features.enableReviews)
    Set {
        /// Setting path
        path: String,
        /// New value
        value: String,
    },

    /// Restore the default settings
    Reset,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show every resolved value and where it came from
    Show,

    /// Get a value from this shop's config file
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a value in this shop's config file
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
}

/// Raw key subcommands
#[derive(Subcommand, Debug)]
pub enum KvCommands {
    /// List stored keys
    List,

    /// Print the raw value of a key
    Get {
        /// Storage key
        key: String,
    },

    /// Store a raw JSON value under a key
    Set {
        /// Storage key
        key: String,
        /// JSON value
        value: String,
    },

    /// Remove a key
    Rm {
        /// Storage key
        key: String,
    },
}
