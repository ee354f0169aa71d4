use crate::config::DeployPlan;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};
use std::fs::File;
use std::path::Path;

/// Load and parse a deployment plan from a YAML file
pub fn load_plan(plan_path: &Path) -> Result<DeployPlan> {
    info!("Loading deployment plan from: {:?}", plan_path);

    // Open the plan file
    let file = File::open(plan_path)
        .wrap_err_with(|| format!("Failed to open plan '{}'", plan_path.display()))?;

    // Parse the YAML content
    let plan: DeployPlan = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse plan '{}'", plan_path.display()))?;

    if plan.contracts.is_empty() {
        warn!("Plan declares no contracts; the manifest will be written empty");
    }

    // Validate the plan
    plan.validate()?;

    info!(
        "Plan for environment '{}' lists {} contract(s)",
        plan.general.environment,
        plan.contracts.len()
    );
    Ok(plan)
}
