//! Shopkeep CLI - storefront catalog, checkout and back-office.

use clap::Parser;
use shopkeep::action_log;
use shopkeep::cli::{
    AdminCommands, BulkCommands, CartCommands, CheckoutCommands, Cli, Commands, ConfigCommands,
    CustomerCommands, CustomerFields, ImportArgs, ImportCommands, KvCommands, OrderCommands,
    ProductCommands, ProductFields, SettingsCommands, ShippingArgs,
};
use shopkeep::commands::catalog::{ProductInput, ProductUpdate};
use shopkeep::commands::import::{HtmlSource, ImportOptions};
use shopkeep::commands::{self, Output, admin, catalog, customers, import, orders, shopping};
use shopkeep::config::{self, ConfigOverrides, OutputFormat};
use shopkeep::logging;
use shopkeep::models::{CustomerDraft, CustomerPatch, ShippingDraft};
use shopkeep::storage::Storage;
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let shop_path = resolve_shop_path(cli.shop_path, cli.human_readable);
    let human = cli.human_readable || prefers_human(&shop_path, cli.ephemeral);

    // Serialize command for logging
    let (cmd_name, args_json) = serialize_command(&cli.command);

    let start = Instant::now();
    let result = run_command(cli.command, &shop_path, cli.ephemeral, human);
    let duration = start.elapsed().as_millis() as u64;

    let (success, error) = match &result {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };

    // Ephemeral runs leave no trace on disk
    if !cli.ephemeral {
        action_log::log_action(&shop_path, &cmd_name, args_json, success, error, duration);
    }

    if let Err(e) = result {
        print_error(&e.to_string(), human);
        process::exit(1);
    }
}

fn print_error(message: &str, human: bool) {
    if human {
        eprintln!("Error: {}", message);
    } else {
        eprintln!("{}", serde_json::json!({ "error": message }));
    }
}

/// Resolve the shop directory: --shop flag > SHOP_DIR env > current directory.
///
/// An explicit path must exist.
fn resolve_shop_path(explicit_path: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit_path {
        Some(path) => {
            if !path.exists() {
                print_error(
                    &format!("Specified shop path does not exist: {}", path.display()),
                    human,
                );
                process::exit(1);
            }
            path
        }
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Whether `output-format human` is configured for this shop (or system-wide).
fn prefers_human(shop_path: &Path, ephemeral: bool) -> bool {
    let overrides = ConfigOverrides::default();
    let resolved = match Storage::open(shop_path) {
        Ok(storage) if !ephemeral => config::resolve_config(&storage, &overrides),
        _ => config::resolve_without_shop(&overrides),
    };
    match resolved {
        Ok(config) => *config.output_format() == OutputFormat::Human,
        Err(e) => {
            tracing::debug!(error = %e, "could not resolve output format");
            false
        }
    }
}

fn run_command(
    command: Commands,
    shop_path: &Path,
    ephemeral: bool,
    human: bool,
) -> Result<(), shopkeep::Error> {
    if let Commands::Init { backend } = &command {
        if ephemeral {
            return Err(shopkeep::Error::InvalidInput(
                "An ephemeral shop cannot be initialized on disk".to_string(),
            ));
        }
        let result = commands::init(shop_path, backend.as_deref())?;
        output(&result, human);
        return Ok(());
    }

    let mut storage = if ephemeral {
        Storage::in_memory()
    } else {
        Storage::open(shop_path)?
    };
    let storage = &mut storage;

    match command {
        // Runs before storage is opened
        Commands::Init { .. } => {}

        Commands::Product { command } => match command {
            ProductCommands::List { category } => {
                output(&catalog::product_list(storage, category.as_deref())?, human)
            }
            ProductCommands::Show { id } => output(&catalog::product_show(storage, &id)?, human),
            ProductCommands::Add {
                name,
                price,
                fields,
            } => {
                let input = ProductInput {
                    name,
                    price,
                    image: fields.image,
                    description: fields.description,
                    source_url: fields.source_url,
                    category: fields.category,
                };
                let result = catalog::product_add(storage, input, &ConfigOverrides::default())?;
                output(&result, human);
            }
            ProductCommands::Update {
                id,
                name,
                price,
                fields,
            } => {
                let update = ProductUpdate {
                    name,
                    price,
                    image: fields.image,
                    description: fields.description,
                    source_url: fields.source_url,
                    category: fields.category,
                };
                output(&catalog::product_update(storage, &id, update)?, human);
            }
            ProductCommands::Delete { id } => {
                output(&catalog::product_delete(storage, &id)?, human)
            }
            ProductCommands::Search { query } => {
                output(&catalog::product_search(storage, &query)?, human)
            }
            ProductCommands::Bulk { command } => match command {
                BulkCommands::Price {
                    op,
                    amount,
                    percent,
                    ids,
                } => output(
                    &catalog::product_bulk_price(storage, &ids, &op, amount, percent)?,
                    human,
                ),
                BulkCommands::Category { category, ids } => output(
                    &catalog::product_bulk_category(storage, &ids, &category)?,
                    human,
                ),
                BulkCommands::Delete { ids } => {
                    output(&catalog::product_bulk_delete(storage, &ids)?, human)
                }
            },
        },

        Commands::Order { command } => match command {
            OrderCommands::List { status, query } => output(
                &orders::order_list(storage, status.as_deref(), query.as_deref())?,
                human,
            ),
            OrderCommands::Show { id } => output(&orders::order_show(storage, &id)?, human),
            OrderCommands::Update {
                id,
                status,
                payment,
            } => output(
                &orders::order_update(storage, &id, status.as_deref(), payment.as_deref())?,
                human,
            ),
            OrderCommands::Delete { id } => output(&orders::order_delete(storage, &id)?, human),
        },

        Commands::Customer { command } => match command {
            CustomerCommands::List => output(&customers::customer_list(storage, None)?, human),
            CustomerCommands::Show { id } => {
                output(&customers::customer_show(storage, &id)?, human)
            }
            CustomerCommands::Summary { id } => {
                output(&customers::customer_summary(storage, &id)?, human)
            }
            CustomerCommands::Add {
                name,
                email,
                fields,
            } => {
                let draft = CustomerDraft {
                    full_name: name,
                    email,
                    phone: fields.phone.unwrap_or_default(),
                    address: fields.address.unwrap_or_default(),
                    city: fields.city.unwrap_or_default(),
                    postal_code: fields.postal_code.unwrap_or_default(),
                    country: fields.country.unwrap_or_default(),
                };
                output(&customers::customer_add(storage, draft)?, human);
            }
            CustomerCommands::Update {
                id,
                name,
                email,
                fields,
            } => {
                let patch = CustomerPatch {
                    full_name: name,
                    email,
                    phone: fields.phone,
                    address: fields.address,
                    city: fields.city,
                    postal_code: fields.postal_code,
                    country: fields.country,
                    orders: None,
                };
                output(&customers::customer_update(storage, &id, patch)?, human);
            }
            CustomerCommands::Delete { id } => {
                output(&customers::customer_delete(storage, &id)?, human)
            }
            CustomerCommands::Search { query } => {
                output(&customers::customer_list(storage, Some(&query))?, human)
            }
        },

        Commands::Cart { command } => match command {
            CartCommands::Show => output(&shopping::cart_show(storage)?, human),
            CartCommands::Add { id, quantity } => {
                output(&shopping::cart_add(storage, &id, quantity)?, human)
            }
            CartCommands::Set { id, quantity } => {
                output(&shopping::cart_set(storage, &id, quantity)?, human)
            }
            CartCommands::Remove { id } => output(&shopping::cart_remove(storage, &id)?, human),
            CartCommands::Clear => output(&shopping::cart_clear(storage)?, human),
        },

        Commands::Checkout { command } => match command {
            CheckoutCommands::Place {
                shipping,
                resume,
                storefront_url,
            } => {
                let mut overrides = ConfigOverrides::new();
                if let Some(url) = storefront_url {
                    overrides = overrides.with_storefront_url(url);
                }
                let result =
                    shopping::checkout_place(storage, shipping_draft(shipping), resume, &overrides)?;
                output(&result, human);
            }
            CheckoutCommands::Save { shipping } => {
                output(&shopping::checkout_save(storage, shipping_draft(shipping))?, human)
            }
            CheckoutCommands::Saved => output(&shopping::checkout_saved(storage)?, human),
            CheckoutCommands::Discard => output(&shopping::checkout_discard(storage)?, human),
            CheckoutCommands::Confirm => output(&shopping::checkout_confirm(storage)?, human),
        },

        Commands::Import { command } => match command {
            ImportCommands::Html { source, args } => {
                let (options, overrides) = import_options(args);
                let source = HtmlSource::parse(&source);
                output(&import::import_html(storage, &source, options, &overrides)?, human);
            }
            ImportCommands::Url { url, args } => {
                let (options, overrides) = import_options(args);
                output(&import::import_url(storage, &url, options, &overrides)?, human);
            }
        },

        Commands::Admin { command } => match command {
            AdminCommands::Login { username, password } => {
                output(&admin::admin_login(storage, &username, &password)?, human)
            }
            AdminCommands::Logout => output(&admin::admin_logout(storage)?, human),
            AdminCommands::Status => output(&admin::admin_status(storage)?, human),
            AdminCommands::SetCredentials { username, password } => output(
                &admin::admin_set_credentials(storage, &username, password.as_deref())?,
                human,
            ),
        },

        Commands::Settings { command } => match command {
            SettingsCommands::Show => output(&admin::settings_show(storage)?, human),
            SettingsCommands::Set { path, value } => {
                output(&admin::settings_set(storage, &path, &value)?, human)
            }
            SettingsCommands::Reset => output(&admin::settings_reset(storage)?, human),
        },

        Commands::Config { command } => match command {
            ConfigCommands::Show => output(
                &commands::config_show(storage, &ConfigOverrides::default())?,
                human,
            ),
            ConfigCommands::Get { key } => output(&commands::config_get(storage, &key)?, human),
            ConfigCommands::Set { key, value } => {
                output(&commands::config_set(storage, &key, &value)?, human)
            }
        },

        Commands::Stats => output(&commands::stats(storage)?, human),

        Commands::Log { limit } => output(&commands::log(storage, limit)?, human),

        Commands::Kv { command } => match command {
            KvCommands::List => output(&commands::kv_list(storage)?, human),
            KvCommands::Get { key } => output(&commands::kv_get(storage, &key)?, human),
            KvCommands::Set { key, value } => {
                output(&commands::kv_set(storage, &key, &value)?, human)
            }
            KvCommands::Rm { key } => output(&commands::kv_rm(storage, &key)?, human),
        },
    }

    Ok(())
}

fn shipping_draft(args: ShippingArgs) -> ShippingDraft {
    ShippingDraft {
        full_name: args.full_name,
        address: args.address,
        city: args.city,
        postal_code: args.postal_code,
        country: args.country,
        phone: args.phone,
        email: args.email,
    }
}

/// An explicit `--category` counts as a CLI override of `default-category`.
fn import_options(args: ImportArgs) -> (ImportOptions, ConfigOverrides) {
    let overrides = match &args.category {
        Some(c) => ConfigOverrides::new().with_default_category(c.clone()),
        None => ConfigOverrides::new(),
    };
    let options = ImportOptions {
        category: args.category,
        only: args.only,
        dry_run: args.dry_run,
    };
    (options, overrides)
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

fn product_fields_json(fields: &ProductFields) -> serde_json::Value {
    serde_json::json!({
        "image": fields.image,
        "description": fields.description,
        "source_url": fields.source_url,
        "category": fields.category,
    })
}

fn customer_fields_json(fields: &CustomerFields) -> serde_json::Value {
    serde_json::json!({
        "phone": fields.phone,
        "address": fields.address,
        "city": fields.city,
        "postal_code": fields.postal_code,
        "country": fields.country,
    })
}

fn shipping_json(s: &ShippingArgs) -> serde_json::Value {
    serde_json::json!({
        "full_name": s.full_name,
        "address": s.address,
        "city": s.city,
        "postal_code": s.postal_code,
        "country": s.country,
        "phone": s.phone,
        "email": s.email,
    })
}

fn import_json(args: &ImportArgs) -> serde_json::Value {
    serde_json::json!({
        "category": args.category,
        "only": args.only,
        "dry_run": args.dry_run,
    })
}

/// Command name and arguments for the action log.
fn serialize_command(command: &Commands) -> (String, serde_json::Value) {
    use serde_json::json;

    let (name, args) = match command {
        Commands::Init { backend } => ("init", json!({ "backend": backend })),

        Commands::Product { command } => match command {
            ProductCommands::List { category } => ("product list", json!({ "category": category })),
            ProductCommands::Show { id } => ("product show", json!({ "id": id })),
            ProductCommands::Add {
                name,
                price,
                fields,
            } => (
                "product add",
                json!({ "name": name, "price": price, "fields": product_fields_json(fields) }),
            ),
            ProductCommands::Update {
                id,
                name,
                price,
                fields,
            } => (
                "product update",
                json!({ "id": id, "name": name, "price": price, "fields": product_fields_json(fields) }),
            ),
            ProductCommands::Delete { id } => ("product delete", json!({ "id": id })),
            ProductCommands::Search { query } => ("product search", json!({ "query": query })),
            ProductCommands::Bulk { command } => match command {
                BulkCommands::Price {
                    op,
                    amount,
                    percent,
                    ids,
                } => (
                    "product bulk price",
                    json!({ "op": op, "amount": amount, "percent": percent, "ids": ids }),
                ),
                BulkCommands::Category { category, ids } => (
                    "product bulk category",
                    json!({ "category": category, "ids": ids }),
                ),
                BulkCommands::Delete { ids } => ("product bulk delete", json!({ "ids": ids })),
            },
        },

        Commands::Order { command } => match command {
            OrderCommands::List { status, query } => {
                ("order list", json!({ "status": status, "query": query }))
            }
            OrderCommands::Show { id } => ("order show", json!({ "id": id })),
            OrderCommands::Update {
                id,
                status,
                payment,
            } => (
                "order update",
                json!({ "id": id, "status": status, "payment": payment }),
            ),
            OrderCommands::Delete { id } => ("order delete", json!({ "id": id })),
        },

        Commands::Customer { command } => match command {
            CustomerCommands::List => ("customer list", json!({})),
            CustomerCommands::Show { id } => ("customer show", json!({ "id": id })),
            CustomerCommands::Summary { id } => ("customer summary", json!({ "id": id })),
            CustomerCommands::Add {
                name,
                email,
                fields,
            } => (
                "customer add",
                json!({ "name": name, "email": email, "fields": customer_fields_json(fields) }),
            ),
            CustomerCommands::Update {
                id,
                name,
                email,
                fields,
            } => (
                "customer update",
                json!({ "id": id, "name": name, "email": email, "fields": customer_fields_json(fields) }),
            ),
            CustomerCommands::Delete { id } => ("customer delete", json!({ "id": id })),
            CustomerCommands::Search { query } => ("customer search", json!({ "query": query })),
        },

        Commands::Cart { command } => match command {
            CartCommands::Show => ("cart show", json!({})),
            CartCommands::Add { id, quantity } => {
                ("cart add", json!({ "id": id, "quantity": quantity }))
            }
            CartCommands::Set { id, quantity } => {
                ("cart set", json!({ "id": id, "quantity": quantity }))
            }
            CartCommands::Remove { id } => ("cart remove", json!({ "id": id })),
            CartCommands::Clear => ("cart clear", json!({})),
        },

        Commands::Checkout { command } => match command {
            CheckoutCommands::Place {
                shipping,
                resume,
                storefront_url,
            } => (
                "checkout place",
                json!({
                    "shipping": shipping_json(shipping),
                    "resume": resume,
                    "storefront_url": storefront_url,
                }),
            ),
            CheckoutCommands::Save { shipping } => {
                ("checkout save", json!({ "shipping": shipping_json(shipping) }))
            }
            CheckoutCommands::Saved => ("checkout saved", json!({})),
            CheckoutCommands::Discard => ("checkout discard", json!({})),
            CheckoutCommands::Confirm => ("checkout confirm", json!({})),
        },

        Commands::Import { command } => match command {
            ImportCommands::Html { source, args } => (
                "import html",
                json!({ "source": source, "options": import_json(args) }),
            ),
            ImportCommands::Url { url, args } => (
                "import url",
                json!({ "url": url, "options": import_json(args) }),
            ),
        },

        Commands::Admin { command } => match command {
            AdminCommands::Login { username, password } => (
                "admin login",
                json!({ "username": username, "password": password }),
            ),
            AdminCommands::Logout => ("admin logout", json!({})),
            AdminCommands::Status => ("admin status", json!({})),
            AdminCommands::SetCredentials { username, password } => (
                "admin set-credentials",
                json!({ "username": username, "password": password }),
            ),
        },

        Commands::Settings { command } => match command {
            SettingsCommands::Show => ("settings show", json!({})),
            SettingsCommands::Set { path, value } => {
                ("settings set", json!({ "path": path, "value": value }))
            }
            SettingsCommands::Reset => ("settings reset", json!({})),
        },

        Commands::Config { command } => match command {
            ConfigCommands::Show => ("config show", json!({})),
            ConfigCommands::Get { key } => ("config get", json!({ "key": key })),
            ConfigCommands::Set { key, value } => {
                ("config set", json!({ "key": key, "value": value }))
            }
        },

        Commands::Stats => ("stats", json!({})),

        Commands::Log { limit } => ("log", json!({ "limit": limit })),

        Commands::Kv { command } => match command {
            KvCommands::List => ("kv list", json!({})),
            KvCommands::Get { key } => ("kv get", json!({ "key": key })),
            KvCommands::Set { key, value } => ("kv set", json!({ "key": key, "value": value })),
            KvCommands::Rm { key } => ("kv rm", json!({ "key": key })),
        },
    };

    (name.to_string(), args)
}
