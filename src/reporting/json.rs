use crate::reporting::model::RunReport;

pub fn render(report: &RunReport) -> anyhow::Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}
