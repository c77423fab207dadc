//! The `restful` feature: turns on the derived REST surface and the
//! `routes` command.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::cli::{ArgSpec, Command};
use crate::config::Configure;
use crate::module::FeatureDescriptor;
use crate::restful::{RouteRow, RESTFUL_FEATURE};

pub const FEATURE: &str = RESTFUL_FEATURE;

pub async fn build(configure: Arc<Configure>, _params: Value) -> anyhow::Result<FeatureDescriptor> {
    let api = &configure.config().api;
    Ok(FeatureDescriptor::new()
        .global()
        .option(
            "restful",
            json!({ "prefix": api.prefix, "docs": api.docs }),
        )
        .command(routes_command()))
}

fn routes_command() -> Command {
    Command::new("routes", "Print the resolved route table", |ctx| async move {
        let restful = ctx
            .app
            .restful()
            .ok_or_else(|| anyhow::anyhow!("the restful feature is not enabled"))?;
        let rows = restful.describe();
        if ctx.flag("json") {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            for line in render_rows(&rows) {
                println!("{}", line);
            }
        }
        Ok(())
    })
    .arg(ArgSpec::flag("json", "Print the table as JSON"))
}

pub fn render_rows(rows: &[RouteRow]) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let access = if row.guest {
                "guest".to_string()
            } else {
                format!("{} checker(s)", row.checkers)
            };
            format!(
                "{:<7} {:<32} {:<10} {:<8} {}",
                row.method, row.path, row.resource, row.action, access
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restful::CrudAction;

    #[test]
    fn test_render_rows() {
        let rows = vec![
            RouteRow {
                method: "GET".to_string(),
                path: "/api/posts".to_string(),
                resource: "post".to_string(),
                action: CrudAction::List,
                input: "QueryPostDto".to_string(),
                guest: true,
                checkers: 0,
            },
            RouteRow {
                method: "POST".to_string(),
                path: "/api/posts".to_string(),
                resource: "post".to_string(),
                action: CrudAction::Store,
                input: "CreatePostDto".to_string(),
                guest: false,
                checkers: 1,
            },
        ];
        let lines = render_rows(&rows);
        assert!(lines[0].starts_with("GET"));
        assert!(lines[0].ends_with("guest"));
        assert!(lines[1].ends_with("1 checker(s)"));
    }
}
