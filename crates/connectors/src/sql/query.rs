use model::{
    config::{Filter, FilterOp},
    core::value::Value,
};

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn operator_sql(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Eq => "=",
        FilterOp::Ne => "<>",
        FilterOp::Lt => "<",
        FilterOp::Lte => "<=",
        FilterOp::Gt => ">",
        FilterOp::Gte => ">=",
    }
}

/// Renders the bounded range scan for one partition together with its
/// ordered parameter values. Range bounds come first, pushed-down
/// filters after, so placeholders and values stay in lockstep.
pub fn select_range(
    table: &str,
    columns: &[String],
    key: &str,
    start: Option<&Value>,
    end: Option<&Value>,
    filters: &[Filter],
) -> (String, Vec<Value>) {
    let mut sql = String::from("SELECT ");
    if columns.is_empty() {
        sql.push('*');
    } else {
        let quoted: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
        sql.push_str(&quoted.join(", "));
    }
    sql.push_str(" FROM ");
    sql.push_str(&quote_identifier(table));

    let mut params = Vec::new();
    let mut predicates = Vec::new();
    if let Some(value) = start {
        params.push(value.clone());
        predicates.push(format!("{} >= ${}", quote_identifier(key), params.len()));
    }
    if let Some(value) = end {
        params.push(value.clone());
        predicates.push(format!("{} < ${}", quote_identifier(key), params.len()));
    }
    for filter in filters {
        params.push(filter.value.clone());
        predicates.push(format!(
            "{} {} ${}",
            quote_identifier(&filter.field),
            operator_sql(filter.op),
            params.len()
        ));
    }
    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }

    (sql, params)
}

/// Renders the single-record upsert for a column set. Key columns form
/// the conflict target; every other column is overwritten from the
/// incoming row. With no non-key columns the conflict is ignored, and
/// with no keys at all the statement degrades to a plain insert.
pub fn upsert(table: &str, columns: &[String], keys: &[String]) -> String {
    let mut sql = String::from("INSERT INTO ");
    sql.push_str(&quote_identifier(table));
    sql.push_str(" (");
    let quoted: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
    sql.push_str(&quoted.join(", "));
    sql.push_str(") VALUES (");
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    sql.push_str(&placeholders.join(", "));
    sql.push(')');

    if keys.is_empty() {
        return sql;
    }

    sql.push_str(" ON CONFLICT (");
    let quoted_keys: Vec<String> = keys.iter().map(|k| quote_identifier(k)).collect();
    sql.push_str(&quoted_keys.join(", "));
    sql.push(')');

    let assignments: Vec<String> = columns
        .iter()
        .filter(|c| !keys.contains(c))
        .map(|c| {
            let quoted = quote_identifier(c);
            format!("{quoted} = EXCLUDED.{quoted}")
        })
        .collect();
    if assignments.is_empty() {
        sql.push_str(" DO NOTHING");
    } else {
        sql.push_str(" DO UPDATE SET ");
        sql.push_str(&assignments.join(", "));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_renders_projection_and_range() {
        let (sql, params) = select_range(
            "orders",
            &["id".to_string(), "total".to_string()],
            "id",
            Some(&Value::Int(0)),
            Some(&Value::Int(25)),
            &[],
        );
        assert_eq!(
            sql,
            r#"SELECT "id", "total" FROM "orders" WHERE "id" >= $1 AND "id" < $2"#
        );
        assert_eq!(params, vec![Value::Int(0), Value::Int(25)]);
    }

    #[test]
    fn select_defaults_to_star_and_skips_absent_bounds() {
        let (sql, params) = select_range("orders", &[], "id", None, None, &[]);
        assert_eq!(sql, r#"SELECT * FROM "orders""#);
        assert!(params.is_empty());
    }

    #[test]
    fn select_appends_filters_after_the_range() {
        let filters = vec![Filter::new(
            "status",
            FilterOp::Eq,
            Value::String("open".into()),
        )];
        let (sql, params) =
            select_range("orders", &[], "id", Some(&Value::Int(10)), None, &filters);
        assert_eq!(
            sql,
            r#"SELECT * FROM "orders" WHERE "id" >= $1 AND "status" = $2"#
        );
        assert_eq!(params, vec![Value::Int(10), Value::String("open".into())]);
    }

    #[test]
    fn upsert_overwrites_non_key_columns() {
        let sql = upsert(
            "orders",
            &["id".to_string(), "total".to_string(), "status".to_string()],
            &["id".to_string()],
        );
        assert_eq!(
            sql,
            concat!(
                "INSERT INTO \"orders\" (\"id\", \"total\", \"status\") VALUES ($1, $2, $3) ",
                "ON CONFLICT (\"id\") DO UPDATE SET \"total\" = EXCLUDED.\"total\", ",
                "\"status\" = EXCLUDED.\"status\""
            )
        );
    }

    #[test]
    fn upsert_with_only_key_columns_does_nothing_on_conflict() {
        let sql = upsert("seen", &["id".to_string()], &["id".to_string()]);
        assert_eq!(
            sql,
            r#"INSERT INTO "seen" ("id") VALUES ($1) ON CONFLICT ("id") DO NOTHING"#
        );
    }

    #[test]
    fn upsert_without_keys_is_a_plain_insert() {
        let sql = upsert("log", &["line".to_string()], &[]);
        assert_eq!(sql, r#"INSERT INTO "log" ("line") VALUES ($1)"#);
    }
}
