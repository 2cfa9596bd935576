//! Curated table catalog and allow-list matching.
//!
//! The catalog is the fixed, hand-maintained universe of tables eligible for
//! context rendering. It is static configuration, not derived from the live
//! store: a table absent from this catalog is never described to a caller,
//! even if it exists in the database and is named by an allow-list.
//!
//! An instance's allow-list narrows the catalog further. Each entry takes one
//! of three forms, matched case-insensitively:
//!
//! - a bare table name (matches that table in any schema)
//! - a qualified `schema.table` pair
//! - a bare schema name (matches every table in that schema)
//!
//! A table is included when any rule matches for any entry.

/// Key tables considered relevant for business queries, in fixed render
/// order. Schema order and per-schema table order are part of the contract.
pub const KEY_TABLES: &[(&str, &[&str])] = &[
    (
        "Sales",
        &[
            "Customers",
            "Orders",
            "OrderLines",
            "Invoices",
            "InvoiceLines",
            "CustomerTransactions",
            "BuyingGroups",
            "CustomerCategories",
            "SpecialDeals",
        ],
    ),
    (
        "Purchasing",
        &[
            "Suppliers",
            "PurchaseOrders",
            "PurchaseOrderLines",
            "SupplierCategories",
            "SupplierTransactions",
        ],
    ),
    (
        "Warehouse",
        &[
            "StockItems",
            "StockItemHoldings",
            "StockItemTransactions",
            "StockGroups",
            "Colors",
            "PackageTypes",
            "ColdRoomTemperatures",
            "VehicleTemperatures",
        ],
    ),
    (
        "Application",
        &[
            "People",
            "Cities",
            "Countries",
            "StateProvinces",
            "DeliveryMethods",
            "PaymentMethods",
            "TransactionTypes",
            "SystemParameters",
        ],
    ),
];

/// Test one allow-list entry against a `(schema, table)` pair.
///
/// Pure predicate so the filter logic stays unit-testable independent of
/// any I/O.
pub fn entry_matches(schema: &str, table: &str, entry: &str) -> bool {
    let entry = entry.trim();

    // Bare table name, any schema
    if entry.eq_ignore_ascii_case(table) {
        return true;
    }

    // Qualified schema.table
    if let Some((entry_schema, entry_table)) = entry.split_once('.') {
        return entry_schema.eq_ignore_ascii_case(schema)
            && entry_table.eq_ignore_ascii_case(table);
    }

    // Whole schema
    entry.eq_ignore_ascii_case(schema)
}

/// Whether a catalog table passes the allow-list. An empty allow-list means
/// no filtering.
pub fn table_allowed(schema: &str, table: &str, allow_list: &[String]) -> bool {
    allow_list.is_empty()
        || allow_list
            .iter()
            .any(|entry| entry_matches(schema, table, entry))
}
