//! Statement templates parameterized by n-gram order.

use crate::model::ngram::NgramOrder;

/// Upper bound of bound parameters per statement.
///
/// 999 is the historical `SQLITE_MAX_VARIABLE_NUMBER` and is far below the
/// MySQL prepared statement limit.
pub const MAX_BOUND_PARAMS: usize = 999;

/// SQL flavor used when rendering statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlDialect {
    /// Bare `{N}grams` identifiers and MySQL column types.
    MySql,
    /// Double-quoted `"{N}grams"` identifiers, since SQLite rejects bare
    /// identifiers starting with a digit.
    #[default]
    Sqlite,
}

impl SqlDialect {
    fn table(self, order: NgramOrder) -> String {
        match self {
            Self::MySql => order.table_name(),
            Self::Sqlite => format!("\"{}\"", order.table_name()),
        }
    }

    fn word_type(self) -> &'static str {
        match self {
            Self::MySql => "VARCHAR(255)",
            Self::Sqlite => "TEXT",
        }
    }

    fn count_type(self) -> &'static str {
        match self {
            Self::MySql => "BIGINT",
            Self::Sqlite => "INTEGER",
        }
    }
}

/// Statements derived once per store from its order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplates {
    order: NgramOrder,
    dialect: SqlDialect,
    add: String,
    get: String,
}

impl QueryTemplates {
    pub fn new(order: NgramOrder, dialect: SqlDialect) -> Self {
        Self {
            order,
            dialect,
            add: build_add_query(order, dialect),
            get: build_get_query(order, dialect),
        }
    }

    pub fn order(&self) -> NgramOrder {
        self.order
    }

    /// Single-row insert with `N + 1` placeholders.
    pub fn add(&self) -> &str {
        &self.add
    }

    /// Pattern lookup with one `LIKE ?` per word column.
    pub fn get(&self) -> &str {
        &self.get
    }

    /// Multi-row insert for `rows` rows.
    pub fn bulk_add(&self, rows: usize) -> String {
        build_bulk_add_query(self.order, self.dialect, rows)
    }

    /// `CREATE TABLE IF NOT EXISTS` for the order's table.
    pub fn create_table(&self) -> String {
        build_create_table_query(self.order, self.dialect)
    }

    /// Largest row count a single bulk insert may carry under
    /// [`MAX_BOUND_PARAMS`].
    pub fn rows_per_bulk_statement(&self) -> usize {
        (MAX_BOUND_PARAMS / (self.order.get() + 1)).max(1)
    }
}

/// Builds `insert into {N}grams (word1, …, wordN, count) values (?, …, ?)`.
pub fn build_add_query(order: NgramOrder, dialect: SqlDialect) -> String {
    let n = order.get();
    let mut sql = format!("insert into {} (", dialect.table(order));
    push_column_list(&mut sql, n);
    sql.push_str(") values ");
    push_placeholder_group(&mut sql, n + 1);
    sql
}

/// Builds `SELECT * FROM {N}grams WHERE word1 LIKE ? AND … wordN LIKE ?`.
pub fn build_get_query(order: NgramOrder, dialect: SqlDialect) -> String {
    let mut sql = format!("SELECT * FROM {} WHERE", dialect.table(order));
    for i in 1..=order.get() {
        if i > 1 {
            sql.push_str(" AND");
        }
        sql.push_str(&format!(" word{i} LIKE ?"));
    }
    sql
}

/// Builds `INSERT INTO {N}grams (word1, …, count) VALUES (?, …), (?, …);`
/// with one placeholder group per row.
pub fn build_bulk_add_query(order: NgramOrder, dialect: SqlDialect, rows: usize) -> String {
    let n = order.get();
    let mut sql = format!("INSERT INTO {} (", dialect.table(order));
    push_column_list(&mut sql, n);
    sql.push_str(") VALUES ");
    for row in 0..rows {
        if row > 0 {
            sql.push_str(", ");
        }
        push_placeholder_group(&mut sql, n + 1);
    }
    sql.push(';');
    sql
}

/// Builds the `CREATE TABLE IF NOT EXISTS` statement for the order's table.
///
/// No uniqueness constraint is declared on the word columns.
pub fn build_create_table_query(order: NgramOrder, dialect: SqlDialect) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (", dialect.table(order));
    for i in 1..=order.get() {
        sql.push_str(&format!("word{i} {} NOT NULL, ", dialect.word_type()));
    }
    sql.push_str(&format!("count {} NOT NULL)", dialect.count_type()));
    sql
}

fn push_column_list(sql: &mut String, n: usize) {
    for i in 1..=n {
        sql.push_str(&format!("word{i}, "));
    }
    sql.push_str("count");
}

fn push_placeholder_group(sql: &mut String, width: usize) {
    sql.push('(');
    for i in 0..width {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push('?');
    }
    sql.push(')');
}
