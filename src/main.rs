mod api;
mod config;
mod document;
mod error;

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tabled::{settings::Style, Table, Tabled};

use crate::api::types::{ApiDocument, Contact, PaymentProof, Product};
use crate::api::{ApiClient, ListQuery};
use crate::config::{
    config_dir, load_config, resolve_download_dir, Config, Session, CONFIG_TEMPLATE,
};
use crate::document::{
    available_actions, transition_target, Action, DocumentKind, DraftDocument, ItemField,
    PaymentStatus,
};
use crate::error::{ErpError, Result};

#[derive(Parser)]
#[command(name = "erpcli")]
#[command(version, about = "Command-line client for the Shiv Furniture ERP", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.erpcli or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PartyKind {
    Customer,
    Vendor,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config file
    Init,

    /// Log in and store the session token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (prompted on stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List catalog products
    Products {
        /// Number of products to fetch
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// List contacts (customers and vendors)
    Contacts {
        /// Restrict to customers or vendors
        #[arg(long, value_enum)]
        kind: Option<PartyKind>,
    },

    /// List documents of a kind
    List {
        /// Document kind
        #[arg(value_enum)]
        kind: DocumentKind,

        /// Filter by status (draft, confirmed, posted, ...)
        #[arg(long)]
        status: Option<String>,

        /// Filter by payment status (not_paid, partially_paid, paid)
        #[arg(long)]
        payment: Option<String>,

        /// Search by document number or party
        #[arg(long)]
        search: Option<String>,

        /// Page number (default 1)
        #[arg(long)]
        page: Option<u32>,
    },

    /// Show one document with its line items and available actions
    Show {
        #[arg(value_enum)]
        kind: DocumentKind,
        id: String,
    },

    /// Draft and submit a new document
    Create {
        /// Document kind
        #[arg(value_enum)]
        kind: DocumentKind,

        /// Customer or vendor id
        #[arg(short, long)]
        party: String,

        /// Line items as "product:quantity[:price[:tax]]" (can be repeated);
        /// product matches catalog id, SKU or name
        #[arg(short, long, value_name = "PRODUCT:QTY[:PRICE[:TAX]]")]
        item: Vec<String>,

        /// Document date (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Due/delivery date
        #[arg(long)]
        due: Option<String>,

        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,

        /// Compute and print the preview totals without submitting
        #[arg(long)]
        dry_run: bool,
    },

    /// Confirm a draft order
    Confirm {
        #[arg(value_enum)]
        kind: DocumentKind,
        id: String,
    },

    /// Post a draft invoice or bill
    Post {
        #[arg(value_enum)]
        kind: DocumentKind,
        id: String,
    },

    /// Mark a confirmed sales order as delivered
    Deliver { id: String },

    /// Mark a confirmed purchase order as received
    Receive { id: String },

    /// Cancel a draft or confirmed document
    Cancel {
        #[arg(value_enum)]
        kind: DocumentKind,
        id: String,
    },

    /// Email a posted customer invoice to the customer
    SendEmail { id: String },

    /// Delete a draft document
    Delete {
        #[arg(value_enum)]
        kind: DocumentKind,
        id: String,
    },

    /// Fetch the server-rendered PDF for a document
    Pdf {
        #[arg(value_enum)]
        kind: DocumentKind,
        id: String,

        /// Custom output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open the downloaded PDF with the system default viewer
        #[arg(long)]
        open: bool,
    },

    /// List recorded payments, optionally for one invoice or bill
    Payments {
        /// Filter by customer invoice id
        #[arg(long)]
        invoice: Option<String>,

        /// Filter by vendor bill id
        #[arg(long)]
        bill: Option<String>,
    },

    /// Record a payment against an invoice or bill
    AddPayment {
        /// Payment amount
        amount: f64,

        /// Customer invoice id (incoming payment)
        #[arg(long)]
        invoice: Option<String>,

        /// Vendor bill id (outgoing payment)
        #[arg(long)]
        bill: Option<String>,

        /// Payment method (default: bank_transfer)
        #[arg(long)]
        method: Option<String>,

        /// Payment date (default: today)
        #[arg(long)]
        date: Option<String>,

        /// External reference number
        #[arg(long)]
        reference: Option<String>,
    },

    /// Start a gateway checkout for a portal invoice
    Pay {
        /// Customer invoice id
        invoice: String,
    },

    /// Submit gateway checkout proof for server-side verification
    VerifyPayment {
        /// Customer invoice id
        invoice: String,

        #[arg(long)]
        order_id: String,

        #[arg(long)]
        payment_id: String,

        #[arg(long)]
        signature: String,
    },

    /// Show the dashboard summary counters
    Summary,

    /// Show the unread notification count
    Notifications {
        /// Poll on a fixed interval instead of exiting
        #[arg(long)]
        watch: bool,

        /// Poll interval in seconds
        #[arg(long, default_value_t = 30)]
        interval: u64,
    },
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Login { email, password } => cmd_login(&cfg_dir, &email, password),
        Commands::Logout => cmd_logout(&cfg_dir),
        Commands::Whoami => cmd_whoami(&cfg_dir),
        Commands::Products { per_page } => cmd_products(&cfg_dir, per_page),
        Commands::Contacts { kind } => cmd_contacts(&cfg_dir, kind),
        Commands::List {
            kind,
            status,
            payment,
            search,
            page,
        } => cmd_list(&cfg_dir, kind, status, payment, search, page),
        Commands::Show { kind, id } => cmd_show(&cfg_dir, kind, &id),
        Commands::Create {
            kind,
            party,
            item,
            date,
            due,
            notes,
            dry_run,
        } => cmd_create(&cfg_dir, kind, &party, &item, date, due, notes, dry_run),
        Commands::Confirm { kind, id } => cmd_transition(&cfg_dir, kind, &id, Action::Confirm),
        Commands::Post { kind, id } => cmd_transition(&cfg_dir, kind, &id, Action::Post),
        Commands::Deliver { id } => {
            cmd_transition(&cfg_dir, DocumentKind::SalesOrder, &id, Action::Deliver)
        }
        Commands::Receive { id } => {
            cmd_transition(&cfg_dir, DocumentKind::PurchaseOrder, &id, Action::Receive)
        }
        Commands::Cancel { kind, id } => cmd_transition(&cfg_dir, kind, &id, Action::Cancel),
        Commands::SendEmail { id } => cmd_send_email(&cfg_dir, &id),
        Commands::Delete { kind, id } => cmd_delete(&cfg_dir, kind, &id),
        Commands::Pdf {
            kind,
            id,
            output,
            open,
        } => cmd_pdf(&cfg_dir, kind, &id, output, open),
        Commands::Payments { invoice, bill } => cmd_payments(&cfg_dir, invoice, bill),
        Commands::AddPayment {
            amount,
            invoice,
            bill,
            method,
            date,
            reference,
        } => cmd_add_payment(&cfg_dir, amount, invoice, bill, method, date, reference),
        Commands::Pay { invoice } => cmd_pay(&cfg_dir, &invoice),
        Commands::VerifyPayment {
            invoice,
            order_id,
            payment_id,
            signature,
        } => cmd_verify_payment(&cfg_dir, &invoice, order_id, payment_id, signature),
        Commands::Summary => cmd_summary(&cfg_dir),
        Commands::Notifications { watch, interval } => {
            cmd_notifications(&cfg_dir, watch, interval)
        }
    }
}

/// Load config and build an API client, attaching the stored session token.
fn api_client(cfg_dir: &Path, require_session: bool) -> Result<(Config, ApiClient)> {
    if !cfg_dir.exists() {
        return Err(ErpError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    let config = load_config(cfg_dir)?;
    let session = Session::load(cfg_dir)?;
    if require_session && session.is_none() {
        return Err(ErpError::NotLoggedIn);
    }
    let client = ApiClient::new(
        &config.api_base_url(),
        config.api.timeout_secs,
        session.map(|s| s.access_token),
    );
    Ok((config, client))
}

/// Initialize config directory with a template config file
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(ErpError::AlreadyInitialized(cfg_dir.clone()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("downloads"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized erpcli config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point at your ERP API:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Log in:                 erpcli login --email you@company.com");
    println!();
    println!("Then try:");
    println!("  erpcli products");
    println!("  erpcli list sales-order");

    Ok(())
}

fn cmd_login(cfg_dir: &Path, email: &str, password: Option<String>) -> Result<()> {
    let (_, client) = api_client(cfg_dir, false)?;

    let password = match password {
        Some(p) => p,
        None => {
            eprint!("Password: ");
            std::io::stderr().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            line.trim_end().to_string()
        }
    };

    let response = client.login(email, &password)?;
    let session = Session {
        access_token: response.access_token,
        refresh_token: response.refresh_token,
        email: response.user.email.clone(),
        full_name: response.user.full_name.clone(),
        role: response.user.role.clone(),
    };
    session.save(cfg_dir)?;

    println!("Logged in as {} ({})", session.email, session.role);
    Ok(())
}

fn cmd_logout(cfg_dir: &Path) -> Result<()> {
    if Session::clear(cfg_dir)? {
        println!("Logged out.");
    } else {
        println!("No active session.");
    }
    Ok(())
}

fn cmd_whoami(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(ErpError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    let session = Session::load(cfg_dir)?.ok_or(ErpError::NotLoggedIn)?;
    let (_, client) = api_client(cfg_dir, true)?;

    // Prefer the server's view; fall back to the cached identity when the
    // API is unreachable.
    match client.me() {
        Ok(user) => {
            println!("{} ({})", user.email, user.role);
            if !user.full_name.is_empty() {
                println!("{}", user.full_name);
            }
        }
        Err(e) => {
            log::warn!("auth/me failed, showing cached identity: {e}");
            println!("{} ({}) [cached]", session.email, session.role);
        }
    }
    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "UNIT")]
    unit: String,
    #[tabled(rename = "SALE")]
    sale: String,
    #[tabled(rename = "PURCHASE")]
    purchase: String,
    #[tabled(rename = "TAX%")]
    tax: String,
    #[tabled(rename = "ID")]
    id: String,
}

#[derive(Tabled)]
struct ContactRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "TYPE")]
    contact_type: String,
    #[tabled(rename = "EMAIL")]
    email: String,
    #[tabled(rename = "ID")]
    id: String,
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "PARTY")]
    party: String,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "DUE")]
    due: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "PAYMENT")]
    payment: String,
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "PRODUCT")]
    product: String,
    #[tabled(rename = "QTY")]
    quantity: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "TAX%")]
    tax: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TYPE")]
    payment_type: String,
    #[tabled(rename = "METHOD")]
    method: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "RECONCILED")]
    reconciled: String,
}

fn cmd_products(cfg_dir: &Path, per_page: Option<u32>) -> Result<()> {
    let (config, client) = api_client(cfg_dir, true)?;
    let products = client.products(per_page.unwrap_or(100))?;

    if products.is_empty() {
        println!("No products in the catalog.");
        return Ok(());
    }

    let symbol = &config.display.currency_symbol;
    let rows: Vec<ProductRow> = products
        .iter()
        .map(|p| ProductRow {
            sku: p.sku.clone(),
            name: p.name.clone(),
            unit: p.unit.clone(),
            sale: format!("{}{:.2}", symbol, p.sale_price),
            purchase: format!("{}{:.2}", symbol, p.purchase_price),
            tax: format!("{:.0}", p.tax_rate),
            id: p.id.clone(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

fn cmd_contacts(cfg_dir: &Path, kind: Option<PartyKind>) -> Result<()> {
    let (_, client) = api_client(cfg_dir, true)?;

    let contacts: Vec<Contact> = match kind {
        Some(PartyKind::Customer) => client.customers()?,
        Some(PartyKind::Vendor) => client.vendors()?,
        None => client.contacts(None)?,
    };

    if contacts.is_empty() {
        println!("No contacts found.");
        return Ok(());
    }

    let rows: Vec<ContactRow> = contacts
        .iter()
        .map(|c| ContactRow {
            name: c.name.clone(),
            contact_type: c.contact_type.clone(),
            email: c.email.clone().unwrap_or_default(),
            id: c.id.clone(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

fn party_display(doc: &ApiDocument) -> String {
    match &doc.party {
        Some(contact) => contact.name.clone(),
        None => doc.party_id.clone(),
    }
}

fn cmd_list(
    cfg_dir: &Path,
    kind: DocumentKind,
    status: Option<String>,
    payment: Option<String>,
    search: Option<String>,
    page: Option<u32>,
) -> Result<()> {
    let (config, client) = api_client(cfg_dir, true)?;

    let query = ListQuery {
        page: page.unwrap_or(1),
        per_page: config.display.per_page,
        search,
        status,
        payment_status: payment,
    };
    let page = client.list_documents(kind, &query)?;

    if page.items.is_empty() {
        println!("No {}s found.", kind);
        return Ok(());
    }

    let symbol = &config.display.currency_symbol;

    if kind.has_payment_status() {
        let rows: Vec<InvoiceRow> = page
            .items
            .iter()
            .enumerate()
            .map(|(idx, doc)| InvoiceRow {
                index: idx + 1,
                number: doc.number.clone(),
                date: doc.date.clone(),
                total: format_whole_money(doc.total_amount, symbol),
                due: format_whole_money(doc.amount_due, symbol),
                status: doc.status.to_string().to_uppercase(),
                payment: doc
                    .payment_status
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
            })
            .collect();

        // Financial summary uses the server's authoritative amounts
        let shown_total: f64 = page.items.iter().map(|d| d.total_amount).sum();
        let shown_paid: f64 = page.items.iter().map(|d| d.amount_paid).sum();
        let shown_outstanding: f64 = page.items.iter().map(|d| d.amount_due).sum();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        let table = add_financial_footer(
            &table,
            &format_whole_money(shown_total, symbol),
            &format_whole_money(shown_paid, symbol),
            &format_whole_money(shown_outstanding, symbol),
        );
        println!("{table}");
    } else {
        let rows: Vec<OrderRow> = page
            .items
            .iter()
            .enumerate()
            .map(|(idx, doc)| OrderRow {
                index: idx + 1,
                number: doc.number.clone(),
                date: doc.date.clone(),
                total: format_whole_money(doc.total_amount, symbol),
                status: doc.status.to_string().to_uppercase(),
                party: party_display(doc),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    println!();
    println!(
        "Showing {} of {} {}s (page {})",
        page.items.len(),
        page.total,
        kind,
        query.page
    );

    Ok(())
}

fn cmd_show(cfg_dir: &Path, kind: DocumentKind, id: &str) -> Result<()> {
    let (config, client) = api_client(cfg_dir, true)?;
    let doc = client.get_document(kind, id)?;
    let symbol = &config.display.currency_symbol;

    println!("{} {}", kind, doc.number);
    println!("{}", "-".repeat(50));
    println!("Party:    {}", party_display(&doc));
    println!("Date:     {}", doc.date);
    if let Some(due) = &doc.due_date {
        println!("Due:      {due}");
    }
    print!("Status:   {}", doc.status);
    match doc.payment_status {
        Some(p) => println!("  ({p})"),
        None => println!(),
    }

    if !doc.items.is_empty() {
        println!();
        let rows: Vec<ItemRow> = doc
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| ItemRow {
                index: idx + 1,
                product: item.product_name.clone(),
                quantity: format!("{}", item.quantity),
                price: format!("{}{:.2}", symbol, item.unit_price),
                tax: format!("{:.0}", item.tax_rate),
                amount: format!("{}{:.2}", symbol, item.amount),
            })
            .collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    println!();
    println!("Subtotal: {}{}", symbol, format_amount(doc.subtotal));
    println!("Tax:      {}{}", symbol, format_amount(doc.tax_amount));
    println!("Total:    {}{}", symbol, format_amount(doc.total_amount));
    if kind.has_payment_status() {
        println!("Paid:     {}{}", symbol, format_amount(doc.amount_paid));
        println!("Due:      {}{}", symbol, format_amount(doc.amount_due));
    }
    if let Some(notes) = &doc.notes {
        if !notes.is_empty() {
            println!("Notes:    {notes}");
        }
    }

    let actions = available_actions(kind, doc.status, doc.payment_status);
    let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
    println!();
    println!("Actions:  {}", labels.join(", "));

    Ok(())
}

/// Parsed form of one --item argument.
struct ItemSpec {
    product: String,
    quantity: String,
    price: Option<String>,
    tax: Option<String>,
}

/// Parse item input like "oak-table:2" or "oak-table:2:950:12"
fn parse_item_spec(input: &str) -> Result<ItemSpec> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() < 2 || parts.len() > 4 || parts[0].is_empty() {
        return Err(ErpError::InvalidItemFormat(input.to_string()));
    }
    Ok(ItemSpec {
        product: parts[0].to_string(),
        quantity: parts[1].to_string(),
        price: parts.get(2).map(|s| s.to_string()),
        tax: parts.get(3).map(|s| s.to_string()),
    })
}

/// Find a catalog product by id, SKU or (case-insensitive) name.
fn find_product<'a>(products: &'a [Product], reference: &str) -> Result<&'a Product> {
    products
        .iter()
        .find(|p| {
            p.id == reference
                || p.sku.eq_ignore_ascii_case(reference)
                || p.name.eq_ignore_ascii_case(reference)
        })
        .ok_or_else(|| ErpError::ProductNotFound(reference.to_string()))
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ErpError::InvalidDate(raw.to_string()))
}

#[allow(clippy::too_many_arguments)]
fn cmd_create(
    cfg_dir: &Path,
    kind: DocumentKind,
    party: &str,
    items_input: &[String],
    date: Option<String>,
    due: Option<String>,
    notes: Option<String>,
    dry_run: bool,
) -> Result<()> {
    // Everything that can be rejected locally is rejected before any
    // network call is made.
    if items_input.is_empty() {
        return Err(ErpError::NoItems);
    }
    let specs: Vec<ItemSpec> = items_input
        .iter()
        .map(|input| parse_item_spec(input))
        .collect::<Result<_>>()?;

    let date = match date {
        Some(raw) => parse_date_arg(&raw)?,
        None => chrono::Local::now().date_naive(),
    };
    let due = due.as_deref().map(parse_date_arg).transpose()?;

    let (config, client) = api_client(cfg_dir, true)?;
    let products = client.products(200)?;

    let mut draft = DraftDocument::new(kind, party, date);
    draft.due_date = due;
    draft.notes = notes;

    for spec in &specs {
        let product = find_product(&products, &spec.product)?;
        let index = draft.add_item();
        draft.select_product(index, product)?;
        draft.set_field(index, ItemField::Quantity, &spec.quantity)?;
        if let Some(price) = &spec.price {
            draft.set_field(index, ItemField::UnitPrice, price)?;
        }
        if let Some(tax) = &spec.tax {
            draft.set_field(index, ItemField::TaxRate, tax)?;
        }
    }

    draft.validate()?;

    // Local preview; the server recomputes and its echo is authoritative
    let totals = draft.totals();
    let symbol = &config.display.currency_symbol;
    println!("Preview for new {kind}");
    println!("  Subtotal: {}{}", symbol, format_amount(totals.subtotal));
    println!("  Tax:      {}{}", symbol, format_amount(totals.tax_total));
    println!("  Total:    {}{}", symbol, format_amount(totals.total));

    if dry_run {
        println!();
        println!("Dry run - nothing submitted.");
        return Ok(());
    }

    let created = client.create_document(kind, &draft)?;
    println!();
    match created {
        Some(doc) => {
            println!("Created {} {}", kind, doc.number);
            println!(
                "  Server total: {}{}",
                symbol,
                format_amount(doc.total_amount)
            );
        }
        None => println!("Created {kind}"),
    }

    Ok(())
}

/// Gate the action against the fetched status, send the transition, then
/// re-fetch for the authoritative result.
fn cmd_transition(cfg_dir: &Path, kind: DocumentKind, id: &str, action: Action) -> Result<()> {
    let (_, client) = api_client(cfg_dir, true)?;

    let doc = client.get_document(kind, id)?;
    let target = transition_target(kind, doc.status, action)?;

    client.transition(kind, id, action)?;

    let refreshed = client.get_document(kind, id)?;
    println!(
        "{} {} is now {}",
        kind, refreshed.number, refreshed.status
    );
    if refreshed.status != target {
        log::warn!(
            "server reports status '{}', expected '{}'",
            refreshed.status,
            target
        );
    }

    Ok(())
}

fn cmd_send_email(cfg_dir: &Path, id: &str) -> Result<()> {
    let (_, client) = api_client(cfg_dir, true)?;
    let kind = DocumentKind::CustomerInvoice;

    let doc = client.get_document(kind, id)?;
    let actions = available_actions(kind, doc.status, doc.payment_status);
    if !actions.contains(&Action::SendEmail) {
        return Err(ErpError::ActionNotAllowed {
            action: Action::SendEmail.label(),
            kind,
            status: doc.status,
        });
    }

    client.send_email(id)?;
    println!("Invoice {} emailed to the customer", doc.number);
    Ok(())
}

fn cmd_delete(cfg_dir: &Path, kind: DocumentKind, id: &str) -> Result<()> {
    let (_, client) = api_client(cfg_dir, true)?;

    let doc = client.get_document(kind, id)?;
    let actions = available_actions(kind, doc.status, doc.payment_status);
    if !actions.contains(&Action::Delete) {
        return Err(ErpError::ActionNotAllowed {
            action: Action::Delete.label(),
            kind,
            status: doc.status,
        });
    }

    client.delete_document(kind, id)?;
    println!("Deleted {} {}", kind, doc.number);
    Ok(())
}

fn cmd_pdf(
    cfg_dir: &Path,
    kind: DocumentKind,
    id: &str,
    output: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    let (config, client) = api_client(cfg_dir, true)?;

    let doc = client.get_document(kind, id)?;
    let link = client.document_pdf(kind, id)?;
    let bytes = client.download(&link.url)?;

    let path = match output {
        Some(path) => path,
        None => {
            let dir = resolve_download_dir(&config.downloads.dir, cfg_dir);
            std::fs::create_dir_all(&dir)?;
            dir.join(format!("{}.pdf", doc.number))
        }
    };
    std::fs::write(&path, bytes)?;

    println!("Saved {}", path.display());
    if open {
        open_path(&path)?;
    }
    Ok(())
}

fn cmd_payments(cfg_dir: &Path, invoice: Option<String>, bill: Option<String>) -> Result<()> {
    let (config, client) = api_client(cfg_dir, true)?;
    let payments = client.payments(invoice.as_deref(), bill.as_deref())?;

    if payments.is_empty() {
        println!("No payments recorded.");
        return Ok(());
    }

    let symbol = &config.display.currency_symbol;
    let rows: Vec<PaymentRow> = payments
        .iter()
        .enumerate()
        .map(|(idx, p)| PaymentRow {
            index: idx + 1,
            number: p.payment_number.clone(),
            date: p.payment_date.clone(),
            payment_type: p.payment_type.clone(),
            method: p.payment_method.clone(),
            amount: format!("{}{:.2}", symbol, p.amount),
            reconciled: if p.is_reconciled { "yes" } else { "-" }.to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    let total: f64 = payments.iter().map(|p| p.amount).sum();
    println!();
    println!("Total: {}{}", symbol, format_amount(total));

    Ok(())
}

fn cmd_add_payment(
    cfg_dir: &Path,
    amount: f64,
    invoice: Option<String>,
    bill: Option<String>,
    method: Option<String>,
    date: Option<String>,
    reference: Option<String>,
) -> Result<()> {
    if amount <= 0.0 {
        return Err(ErpError::InvalidPaymentAmount);
    }
    let (payment_type, kind, id) = match (&invoice, &bill) {
        (Some(id), None) => ("incoming", DocumentKind::CustomerInvoice, id.clone()),
        (None, Some(id)) => ("outgoing", DocumentKind::VendorBill, id.clone()),
        _ => return Err(ErpError::MissingPaymentTarget),
    };
    let date = match date {
        Some(raw) => parse_date_arg(&raw)?,
        None => chrono::Local::now().date_naive(),
    };

    let (config, client) = api_client(cfg_dir, true)?;

    // Record-payment is only offered on posted, not-yet-paid documents
    let doc = client.get_document(kind, &id)?;
    let actions = available_actions(kind, doc.status, doc.payment_status);
    if !actions.contains(&Action::RecordPayment) {
        if doc.payment_status == Some(PaymentStatus::Paid) {
            return Err(ErpError::AlreadyPaid(doc.number));
        }
        return Err(ErpError::ActionNotAllowed {
            action: Action::RecordPayment.label(),
            kind,
            status: doc.status,
        });
    }

    let mut body = json!({
        "payment_type": payment_type,
        "payment_method": method.unwrap_or_else(|| "bank_transfer".to_string()),
        "payment_date": date.format("%Y-%m-%d").to_string(),
        "amount": amount,
        "contact_id": doc.party_id,
    });
    match kind {
        DocumentKind::CustomerInvoice => body["invoice_id"] = json!(id),
        _ => body["bill_id"] = json!(id),
    }
    if let Some(reference) = reference {
        body["reference_number"] = json!(reference);
    }

    client.create_payment(&body)?;

    let symbol = &config.display.currency_symbol;
    println!(
        "Recorded {}{:.2} payment for {}",
        symbol, amount, doc.number
    );
    Ok(())
}

fn cmd_pay(cfg_dir: &Path, invoice_id: &str) -> Result<()> {
    let (config, client) = api_client(cfg_dir, true)?;

    let invoice = client.portal_invoice(invoice_id)?;
    if invoice.payment_status == Some(PaymentStatus::Paid) {
        return Err(ErpError::AlreadyPaid(invoice.number));
    }

    let symbol = &config.display.currency_symbol;
    let key = client.razorpay_key()?;
    let order = client.create_payment_order(invoice_id)?;

    println!("Payment order created for {}", invoice.number);
    println!("  Amount due:   {}{}", symbol, format_amount(invoice.amount_due));
    println!("  Gateway key:  {}", key.key_id);
    println!("  Gateway order: {}", order.order_id);
    println!();
    println!("Complete the checkout with your gateway tooling, then run:");
    println!(
        "  erpcli verify-payment {} --order-id {} --payment-id <id> --signature <sig>",
        invoice_id, order.order_id
    );

    Ok(())
}

fn cmd_verify_payment(
    cfg_dir: &Path,
    invoice_id: &str,
    order_id: String,
    payment_id: String,
    signature: String,
) -> Result<()> {
    let (_, client) = api_client(cfg_dir, true)?;

    let proof = PaymentProof {
        razorpay_order_id: order_id,
        razorpay_payment_id: payment_id,
        razorpay_signature: signature,
    };
    client.verify_payment(invoice_id, &proof)?;

    let invoice = client.portal_invoice(invoice_id)?;
    println!(
        "Payment verified for {}. Payment status: {}",
        invoice.number,
        invoice
            .payment_status
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    Ok(())
}

fn cmd_summary(cfg_dir: &Path) -> Result<()> {
    let (config, client) = api_client(cfg_dir, true)?;
    let summary = client.dashboard()?;
    let symbol = &config.display.currency_symbol;

    println!("Dashboard");
    println!("{}", "-".repeat(50));
    println!("Customers:         {}", summary.total_customers);
    println!("Vendors:           {}", summary.total_vendors);
    println!("Products:          {}", summary.total_products);
    println!("Pending invoices:  {}", summary.pending_invoices);
    println!("Pending bills:     {}", summary.pending_bills);
    println!(
        "Sales this month:  {}{}",
        symbol,
        format_amount(summary.total_sales_this_month)
    );
    println!(
        "Purchases:         {}{}",
        symbol,
        format_amount(summary.total_purchases_this_month)
    );
    println!(
        "Receivable:        {}{}",
        symbol,
        format_amount(summary.total_receivable)
    );
    println!(
        "Payable:           {}{}",
        symbol,
        format_amount(summary.total_payable)
    );
    println!(
        "Net position:      {}{}",
        symbol,
        format_amount(summary.net_position)
    );

    Ok(())
}

fn cmd_notifications(cfg_dir: &Path, watch: bool, interval: u64) -> Result<()> {
    let (_, client) = api_client(cfg_dir, true)?;

    let count = client.unread_count()?;
    println!("Unread notifications: {count}");

    if !watch {
        return Ok(());
    }

    // Fixed-interval poll; a slow or failed poll never reschedules or
    // retries, the next tick just happens on time.
    loop {
        std::thread::sleep(Duration::from_secs(interval));
        match client.unread_count() {
            Ok(count) => {
                let now = chrono::Local::now().format("%H:%M:%S");
                println!("[{now}] Unread notifications: {count}");
            }
            Err(e) => log::warn!("notification poll failed: {e}"),
        }
    }
}

fn open_path(path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()
            .map_err(ErpError::Io)?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()
            .map_err(ErpError::Io)?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", path.to_str().unwrap_or("")])
            .spawn()
            .map_err(ErpError::Io)?;
    }
    Ok(())
}

fn format_whole_money(value: f64, currency_symbol: &str) -> String {
    let rounded = value.round() as i64;
    let grouped = format_grouped_int(rounded);
    format!("{}{:>6}", currency_symbol, grouped)
}

fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format a money amount with two decimal places and thousands separators
fn format_amount(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let parts: Vec<&str> = rounded.split('.').collect();
    let whole = parts[0];
    let frac = parts[1];

    // Group digits in the whole part
    let negative = whole.starts_with('-');
    let digits = if negative { &whole[1..] } else { whole };
    let grouped = format_grouped_int(digits.parse::<i64>().unwrap_or(0));

    if negative {
        format!("-{}.{}", grouped, frac)
    } else {
        format!("{}.{}", grouped, frac)
    }
}

fn add_financial_footer(table: &str, total: &str, paid: &str, outstanding: &str) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let top = lines[0];
    let Some(inner) = top.strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() < 5 {
        return table.to_string();
    }

    // Merge columns #, NUMBER, DATE into one label cell; keep TOTAL; close
    // off every column to the right of it
    let left_width = widths[0] + widths[1] + widths[2] + 2; // +2 for the two ┴ replaced by spaces
    let total_width = widths[3];
    let tail = &widths[4..];

    let rows = [
        ("TOTAL", total),
        ("(-) PAID", paid),
        ("(=) OUTSTANDING", outstanding),
    ];

    // Strip the original bottom border and start building
    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    // First separator: merge left 3 columns, keep TOTAL, close the tail
    out.push_str(&format!(
        "├{}┴{}┴{}┼{}┼",
        "─".repeat(widths[0]),
        "─".repeat(widths[1]),
        "─".repeat(widths[2]),
        "─".repeat(total_width),
    ));
    for (i, width) in tail.iter().enumerate() {
        out.push_str(&"─".repeat(*width));
        out.push(if i == tail.len() - 1 { '╯' } else { '┴' });
    }
    out.push('\n');

    // Summary rows with separators between them
    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>left$} │ {:>total$} │\n",
            label,
            value,
            left = left_width - 2,
            total = total_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(left_width),
                "─".repeat(total_width)
            ));
        }
    }

    // Bottom border
    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(left_width),
        "─".repeat(total_width)
    ));

    out
}
