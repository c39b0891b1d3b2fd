use serde_json::{Map, Value};
use sheetfeed_odoo::FieldSpec;

/// How one output column is extracted from a (parent, child) record pair.
#[derive(Debug, Clone)]
pub enum ColumnRule {
    /// Normalized display of a child field.
    Child(&'static str),
    /// Normalized display of a parent field.
    Parent(&'static str),
    /// Numeric passthrough of a child field; 0 when absent.
    ChildNumber(&'static str),
    /// `[CODE] Name` composite built from two sub-fields of a child
    /// relational field; empty when the field itself is absent.
    ChildCodeName {
        field: &'static str,
        code: &'static str,
        name: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub header: &'static str,
    pub rule: ColumnRule,
}

fn col(header: &'static str, rule: ColumnRule) -> ColumnSpec {
    ColumnSpec { header, rule }
}

/// Everything that distinguishes one synced dataset from another: the source
/// model and field selection, the flat column schema, and the destination
/// geometry. Spreadsheet id / tab overrides come from config.
#[derive(Debug, Clone)]
pub struct DatasetSpec {
    pub name: &'static str,
    pub model: &'static str,
    pub child_field: &'static str,
    pub default_tab: &'static str,
    /// Column letter range cleared before each write, wide enough to cover
    /// the schema with margin.
    pub clear_columns: &'static str,
    /// Cell outside the data range that receives the refresh stamp.
    pub stamp_cell: &'static str,
    pub allowed_company_ids: &'static [i64],
    pub current_company_id: i64,
    pub extra_context: Map<String, Value>,
    pub field_spec: FieldSpec,
    pub columns: Vec<ColumnSpec>,
}

pub fn all() -> Vec<DatasetSpec> {
    vec![purchase_orders(), expense_sheets()]
}

pub fn find(name: &str) -> Option<DatasetSpec> {
    all().into_iter().find(|spec| spec.name == name)
}

pub fn names() -> Vec<&'static str> {
    all().iter().map(|spec| spec.name).collect()
}

pub fn purchase_orders() -> DatasetSpec {
    let line_fields = FieldSpec::new()
        .label("company_id")
        .field("create_date")
        .field("exp_consum_date")
        .field("date_approve")
        .label("order_id")
        .label("po_type")
        .label("itemtypes")
        .label("currency_id")
        .label("item_category")
        .field("name")
        .label("partner_id")
        .label("incoterm_id")
        .label("payment_term_id")
        .label("shipment_mode")
        .field("product_uom_qty")
        .field("price_subtotal")
        .label("state");

    let mut extra_context = Map::new();
    extra_context.insert("quotation_only".to_string(), Value::Bool(true));

    DatasetSpec {
        name: "purchase_orders",
        model: "purchase.order",
        child_field: "order_line",
        default_tab: "Raw_data",
        clear_columns: "A:Q",
        stamp_cell: "R1",
        allowed_company_ids: &[3, 1],
        current_company_id: 3,
        extra_context,
        field_spec: FieldSpec::new().related("order_line", line_fields),
        columns: vec![
            col("Company", ColumnRule::Child("company_id")),
            col("Created on", ColumnRule::Child("create_date")),
            col("Consumption Date", ColumnRule::Child("exp_consum_date")),
            col("PO Approved Date", ColumnRule::Child("date_approve")),
            col("Order Reference", ColumnRule::Child("order_id")),
            col("PO Type", ColumnRule::Child("po_type")),
            col("Item Type", ColumnRule::Child("itemtypes")),
            col("Currency", ColumnRule::Child("currency_id")),
            col("Item Category", ColumnRule::Child("item_category")),
            col("Description", ColumnRule::Child("name")),
            col("Partner", ColumnRule::Child("partner_id")),
            col("Inco Term", ColumnRule::Child("incoterm_id")),
            col("Payment Term", ColumnRule::Child("payment_term_id")),
            col("Shipment Mode", ColumnRule::Child("shipment_mode")),
            col("Total Quantity", ColumnRule::ChildNumber("product_uom_qty")),
            col("Subtotal", ColumnRule::ChildNumber("price_subtotal")),
            col("Status", ColumnRule::Child("state")),
        ],
    }
}

pub fn expense_sheets() -> DatasetSpec {
    let line_fields = FieldSpec::new()
        .field("date")
        .field("create_date")
        .related(
            "product_id",
            FieldSpec::new().field("default_code").field("name"),
        )
        .label("super_category_id")
        .field("name")
        .label("department_id")
        .field("id")
        .label("predicted_category")
        .field("state")
        .field("total_amount")
        .field("total_amount_currency");

    DatasetSpec {
        name: "expense_sheets",
        model: "hr.expense.sheet",
        child_field: "expense_line_ids",
        default_tab: "Expns_Raw_DF",
        clear_columns: "A:L",
        stamp_cell: "M1",
        allowed_company_ids: &[1, 3, 2, 4],
        current_company_id: 1,
        extra_context: Map::new(),
        field_spec: FieldSpec::new()
            .field("code")
            .related("expense_line_ids", line_fields),
        columns: vec![
            col("Number", ColumnRule::Parent("code")),
            col("Expense Date", ColumnRule::Child("date")),
            col("Created Date", ColumnRule::Child("create_date")),
            col(
                "Category",
                ColumnRule::ChildCodeName {
                    field: "product_id",
                    code: "default_code",
                    name: "name",
                },
            ),
            col("Super Category", ColumnRule::Child("super_category_id")),
            col("Description", ColumnRule::Child("name")),
            col("Department", ColumnRule::Child("department_id")),
            col("ID", ColumnRule::Child("id")),
            col("Predicted Category", ColumnRule::Child("predicted_category")),
            col("Status", ColumnRule::Child("state")),
            col("Total", ColumnRule::ChildNumber("total_amount")),
            col(
                "Total In Currency",
                ColumnRule::ChildNumber("total_amount_currency"),
            ),
        ],
    }
}
