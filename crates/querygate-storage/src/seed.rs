// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sample retail database for trying Querygate out.
//!
//! Creates `customers`, `products`, `orders`, `order_items` and `employees`
//! with foreign keys between them. Data is pseudo-random from a fixed seed,
//! so two runs produce identical files. Existing sample tables are replaced.

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use querygate_core::QuerygateError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rusqlite::params;
use tracing::info;

use crate::database::map_tr_err;

const SEED: u64 = 0x5eed_da7a;
const CUSTOMER_COUNT: usize = 100;
const ORDER_COUNT: usize = 200;

const SCHEMA_SQL: &str = "
DROP TABLE IF EXISTS order_items;
DROP TABLE IF EXISTS orders;
DROP TABLE IF EXISTS employees;
DROP TABLE IF EXISTS products;
DROP TABLE IF EXISTS customers;

CREATE TABLE customers (
    customer_id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    phone TEXT,
    address TEXT,
    city TEXT,
    state TEXT,
    zip_code TEXT,
    registration_date DATE,
    total_spent DECIMAL(10,2) DEFAULT 0.00
);

CREATE TABLE products (
    product_id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_name TEXT NOT NULL,
    category TEXT NOT NULL,
    price DECIMAL(10,2) NOT NULL,
    stock_quantity INTEGER DEFAULT 0,
    description TEXT,
    supplier TEXT,
    created_date DATE
);

CREATE TABLE orders (
    order_id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER,
    order_date DATE NOT NULL,
    total_amount DECIMAL(10,2) NOT NULL,
    status TEXT DEFAULT 'pending',
    shipping_address TEXT,
    FOREIGN KEY (customer_id) REFERENCES customers (customer_id)
);

CREATE TABLE order_items (
    item_id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER,
    product_id INTEGER,
    quantity INTEGER NOT NULL,
    unit_price DECIMAL(10,2) NOT NULL,
    total_price DECIMAL(10,2) NOT NULL,
    FOREIGN KEY (order_id) REFERENCES orders (order_id),
    FOREIGN KEY (product_id) REFERENCES products (product_id)
);

CREATE TABLE employees (
    employee_id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    department TEXT,
    position TEXT,
    salary DECIMAL(10,2),
    hire_date DATE,
    manager_id INTEGER,
    FOREIGN KEY (manager_id) REFERENCES employees (employee_id)
);
";

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Michael", "Sarah", "David", "Lisa", "Robert", "Emily", "James", "Jessica",
    "William", "Ashley", "Richard", "Amanda", "Joseph", "Stephanie", "Thomas", "Nicole",
    "Christopher", "Elizabeth",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin",
];

/// City and its state.
const CITIES: &[(&str, &str)] = &[
    ("New York", "NY"),
    ("Los Angeles", "CA"),
    ("Chicago", "IL"),
    ("Houston", "TX"),
    ("Phoenix", "AZ"),
    ("Philadelphia", "PA"),
    ("San Antonio", "TX"),
    ("San Diego", "CA"),
    ("Dallas", "TX"),
    ("San Jose", "CA"),
];

const STREETS: &[&str] = &["Main", "Oak", "Pine", "Elm", "Cedar"];
const ORDER_STATUSES: &[&str] = &["completed", "pending", "shipped", "cancelled"];

/// Name, category, price, stock, supplier.
const PRODUCTS: &[(&str, &str, f64, i64, &str)] = &[
    ("Laptop Pro 15\"", "Electronics", 1299.99, 25, "TechCorp"),
    ("Wireless Mouse", "Electronics", 29.99, 150, "TechCorp"),
    ("Office Chair", "Furniture", 199.99, 40, "ComfortSeating"),
    ("Standing Desk", "Furniture", 399.99, 15, "DeskMakers"),
    ("Coffee Maker", "Appliances", 89.99, 60, "BrewMaster"),
    ("Smartphone X", "Electronics", 799.99, 80, "PhoneTech"),
    ("Bluetooth Headphones", "Electronics", 149.99, 100, "AudioPro"),
    ("Desk Lamp", "Furniture", 45.99, 75, "LightCorp"),
    ("External Hard Drive", "Electronics", 79.99, 90, "DataStore"),
    ("Mechanical Keyboard", "Electronics", 129.99, 50, "GameGear"),
    ("Monitor 24\"", "Electronics", 249.99, 35, "DisplayTech"),
    ("Webcam HD", "Electronics", 69.99, 120, "CamTech"),
    ("Printer All-in-One", "Electronics", 179.99, 30, "PrintPro"),
    ("Tablet 10\"", "Electronics", 329.99, 45, "TabletCorp"),
    ("Smart Watch", "Electronics", 199.99, 70, "WearTech"),
    ("Bookshelf", "Furniture", 129.99, 25, "WoodCraft"),
    ("Table Lamp", "Furniture", 34.99, 85, "LightDesign"),
    ("Microwave Oven", "Appliances", 119.99, 40, "KitchenPro"),
    ("Blender", "Appliances", 59.99, 55, "BlendMaster"),
    ("Air Fryer", "Appliances", 99.99, 65, "CookSmart"),
    ("Gaming Mouse", "Electronics", 79.99, 95, "GameGear"),
    ("USB Hub", "Electronics", 24.99, 200, "ConnectTech"),
    ("Desk Organizer", "Office", 19.99, 150, "OrganizePro"),
    ("Whiteboard", "Office", 49.99, 30, "BoardTech"),
    ("Shredder", "Office", 89.99, 20, "SecureShred"),
    ("File Cabinet", "Furniture", 159.99, 18, "OfficeFurn"),
    ("Ergonomic Cushion", "Furniture", 29.99, 100, "ComfortPlus"),
    ("Power Strip", "Electronics", 19.99, 180, "PowerSafe"),
    ("Cable Management", "Office", 14.99, 250, "CableClean"),
    ("Desk Pad", "Office", 24.99, 120, "DeskStyle"),
    ("Monitor Stand", "Furniture", 39.99, 80, "DisplayRise"),
    ("Laptop Stand", "Furniture", 49.99, 60, "LaptopLift"),
    ("Wireless Charger", "Electronics", 34.99, 110, "ChargeTech"),
    ("Bluetooth Speaker", "Electronics", 59.99, 85, "SoundWave"),
    ("Phone Stand", "Electronics", 12.99, 200, "StandPro"),
    ("Desk Fan", "Appliances", 39.99, 70, "CoolBreeze"),
    ("Humidifier", "Appliances", 69.99, 45, "AirCare"),
    ("Plant Pot", "Decor", 16.99, 150, "GreenThumb"),
    ("Wall Clock", "Decor", 22.99, 90, "TimeStyle"),
    ("Picture Frame", "Decor", 18.99, 130, "FrameCraft"),
    ("Candle Set", "Decor", 26.99, 75, "AromaLux"),
    ("Throw Pillow", "Decor", 19.99, 100, "HomeComfort"),
    ("Wall Art", "Decor", 34.99, 60, "ArtSpace"),
    ("Desk Calendar", "Office", 9.99, 200, "PlannerPro"),
    ("Notebook Set", "Office", 15.99, 180, "WritePlus"),
    ("Pen Holder", "Office", 11.99, 160, "DeskOrg"),
    ("Stapler", "Office", 8.99, 220, "OfficeTools"),
    ("Tape Dispenser", "Office", 6.99, 250, "TapeTech"),
    ("Scissors", "Office", 4.99, 300, "CutPro"),
    ("Calculator", "Office", 12.99, 140, "MathTech"),
];

/// First, last, department, position, salary, hire date, manager id.
const EMPLOYEES: &[(&str, &str, &str, &str, f64, &str, Option<i64>)] = &[
    ("John", "Smith", "Management", "CEO", 150000.0, "2020-01-15", None),
    ("Sarah", "Johnson", "Management", "CTO", 140000.0, "2020-02-01", Some(1)),
    ("Michael", "Brown", "Management", "CFO", 135000.0, "2020-03-15", Some(1)),
    ("Emily", "Davis", "Engineering", "Senior Developer", 95000.0, "2021-01-10", Some(2)),
    ("David", "Wilson", "Engineering", "Senior Developer", 92000.0, "2021-02-20", Some(2)),
    ("Lisa", "Garcia", "Engineering", "Developer", 75000.0, "2022-01-15", Some(4)),
    ("Robert", "Martinez", "Engineering", "Developer", 73000.0, "2022-03-01", Some(4)),
    ("Jessica", "Anderson", "Engineering", "Junior Developer", 60000.0, "2023-01-10", Some(5)),
    ("James", "Taylor", "Sales", "Sales Manager", 85000.0, "2021-05-15", Some(1)),
    ("Amanda", "Thomas", "Sales", "Sales Rep", 55000.0, "2022-06-01", Some(9)),
    ("William", "Jackson", "Sales", "Sales Rep", 52000.0, "2022-08-15", Some(9)),
    ("Ashley", "White", "Marketing", "Marketing Manager", 80000.0, "2021-04-01", Some(1)),
    ("Christopher", "Harris", "Marketing", "Marketing Specialist", 58000.0, "2022-09-01", Some(12)),
    ("Nicole", "Clark", "HR", "HR Manager", 75000.0, "2021-03-15", Some(1)),
    ("Richard", "Lewis", "HR", "HR Specialist", 50000.0, "2022-11-01", Some(14)),
    ("Stephanie", "Lee", "Finance", "Accountant", 65000.0, "2021-07-01", Some(3)),
    ("Joseph", "Walker", "Finance", "Financial Analyst", 62000.0, "2022-04-15", Some(3)),
    ("Elizabeth", "Hall", "Customer Service", "CS Manager", 55000.0, "2021-08-01", Some(1)),
    ("Thomas", "Allen", "Customer Service", "CS Rep", 40000.0, "2023-02-01", Some(18)),
    ("Jennifer", "Young", "Customer Service", "CS Rep", 38000.0, "2023-03-15", Some(18)),
];

/// Questions the sample data can answer, shown by the shell and the gateway.
pub const EXAMPLE_QUESTIONS: &[&str] = &[
    "How many customers do we have?",
    "What are our top 5 best-selling products?",
    "Show me all orders from this month",
    "Which customers have spent the most money?",
    "What's the average order value?",
    "How many employees work in each department?",
    "Show me all products in the Electronics category",
    "Which orders are still pending?",
    "What's our total revenue this year?",
    "Show me customer information for orders over $500",
];

/// Row counts written by [`seed_sample_database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
    pub order_items: usize,
    pub employees: usize,
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- customers ({} records)", self.customers)?;
        writeln!(f, "- products ({} records)", self.products)?;
        writeln!(f, "- orders ({} records)", self.orders)?;
        writeln!(f, "- order_items ({} records)", self.order_items)?;
        write!(f, "- employees ({} records)", self.employees)
    }
}

/// Create (or replace) the sample tables in the SQLite file at `path`.
pub async fn seed_sample_database(path: &Path) -> Result<SeedSummary, QuerygateError> {
    let conn = tokio_rusqlite::Connection::open(path)
        .await
        .map_err(|e| QuerygateError::Storage {
            source: Box::new(e),
        })?;

    let summary = conn
        .call(|conn| {
            let mut rng = StdRng::seed_from_u64(SEED);
            let tx = conn.transaction()?;
            tx.execute_batch(SCHEMA_SQL)?;

            let summary = SeedSummary {
                customers: insert_customers(&tx, &mut rng)?,
                products: insert_products(&tx, &mut rng)?,
                orders: insert_orders(&tx, &mut rng)?,
                order_items: insert_order_items(&tx, &mut rng)?,
                employees: insert_employees(&tx)?,
            };
            tx.commit()?;
            Ok(summary)
        })
        .await
        .map_err(map_tr_err)?;

    info!(path = %path.display(), orders = summary.orders, "sample database created");
    Ok(summary)
}

/// Reference date for generated dates, so output does not depend on the clock.
fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap_or_default()
}

fn days_before_base(days: i64) -> String {
    (base_date() - chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn cents(rng: &mut StdRng, low: f64, high: f64) -> f64 {
    (rng.gen_range(low..high) * 100.0).round() / 100.0
}

fn pick<'a>(rng: &mut StdRng, items: &'a [&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn street_address(rng: &mut StdRng) -> String {
    format!("{} {} St", rng.gen_range(100..=9999), pick(rng, STREETS))
}

fn insert_customers(tx: &rusqlite::Transaction<'_>, rng: &mut StdRng) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare(
        "INSERT INTO customers (first_name, last_name, email, phone, address, city, state,
                                zip_code, registration_date, total_spent)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    for i in 0..CUSTOMER_COUNT {
        let first = pick(rng, FIRST_NAMES);
        let last = pick(rng, LAST_NAMES);
        let email = format!("{}.{}{i}@email.com", first.to_lowercase(), last.to_lowercase());
        let phone = format!(
            "({}) {}-{}",
            rng.gen_range(200..=999),
            rng.gen_range(200..=999),
            rng.gen_range(1000..=9999)
        );
        let address = street_address(rng);
        let (city, state) = CITIES[rng.gen_range(0..CITIES.len())];
        let zip = rng.gen_range(10000..=99999).to_string();
        let registered = days_before_base(rng.gen_range(30..=1000));
        let spent = cents(rng, 50.0, 5000.0);
        stmt.execute(params![
            first, last, email, phone, address, city, state, zip, registered, spent
        ])?;
    }
    Ok(CUSTOMER_COUNT)
}

fn insert_products(tx: &rusqlite::Transaction<'_>, rng: &mut StdRng) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare(
        "INSERT INTO products (product_name, category, price, stock_quantity, description,
                               supplier, created_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for (name, category, price, stock, supplier) in PRODUCTS {
        let description = format!("{category} item supplied by {supplier}");
        let created = days_before_base(rng.gen_range(120..=180));
        stmt.execute(params![name, category, price, stock, description, supplier, created])?;
    }
    Ok(PRODUCTS.len())
}

fn insert_orders(tx: &rusqlite::Transaction<'_>, rng: &mut StdRng) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare(
        "INSERT INTO orders (customer_id, order_date, total_amount, status, shipping_address)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for _ in 0..ORDER_COUNT {
        let customer_id = rng.gen_range(1..=CUSTOMER_COUNT as i64);
        let ordered = days_before_base(rng.gen_range(1..=365));
        let total = cents(rng, 25.0, 1500.0);
        let status = pick(rng, ORDER_STATUSES);
        let address = street_address(rng);
        stmt.execute(params![customer_id, ordered, total, status, address])?;
    }
    Ok(ORDER_COUNT)
}

fn insert_order_items(tx: &rusqlite::Transaction<'_>, rng: &mut StdRng) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare(
        "INSERT INTO order_items (order_id, product_id, quantity, unit_price, total_price)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    let mut count = 0;
    for order_id in 1..=ORDER_COUNT as i64 {
        for _ in 0..rng.gen_range(1..=5) {
            let product_id = rng.gen_range(1..=PRODUCTS.len() as i64);
            let quantity: i64 = rng.gen_range(1..=3);
            let unit_price = cents(rng, 5.0, 500.0);
            let total_price = (unit_price * quantity as f64 * 100.0).round() / 100.0;
            stmt.execute(params![order_id, product_id, quantity, unit_price, total_price])?;
            count += 1;
        }
    }
    Ok(count)
}

fn insert_employees(tx: &rusqlite::Transaction<'_>) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare(
        "INSERT INTO employees (first_name, last_name, email, department, position, salary,
                                hire_date, manager_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for (first, last, department, position, salary, hired, manager) in EMPLOYEES {
        let email = format!("{}.{}@company.com", first.to_lowercase(), last.to_lowercase());
        stmt.execute(params![first, last, email, department, position, salary, hired, manager])?;
    }
    Ok(EMPLOYEES.len())
}
