//! `plan` command: load a scenario, converge a plan, and optionally replay
//! the scenario's scripted graph changes one at a time.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use dstar_lib::{
    DStarPlanner, Error as PlanError, EventEffect, PlannerConfig, Scenario, ScenarioGraph,
};

use crate::output::{render, OutputFormat, PlanReport};

/// Arguments for the plan command.
#[derive(Debug, Clone)]
pub struct PlanCommandArgs {
    pub scenario: PathBuf,
    pub format: OutputFormat,
    /// Apply each scripted event and replan after it.
    pub replay: bool,
}

pub fn handle_plan(args: &PlanCommandArgs) -> Result<()> {
    let mut scenario = Scenario::from_path(&args.scenario)
        .with_context(|| format!("failed to load scenario from {}", args.scenario.display()))?;
    if scenario.config.is_none() {
        scenario.config = Some(PlannerConfig::from_env());
    }
    let mut built = scenario
        .build()
        .context("scenario does not describe a usable graph")?;

    let mut planner = DStarPlanner::new(scenario.planner_config());
    planner
        .initialize(&mut built.graph, built.source, built.goal)
        .map_err(|error| describe(error, &built))?;
    tracing::info!(
        nodes = built.graph.node_count(),
        edges = built.graph.edge_count(),
        events = scenario.events.len(),
        "loaded scenario"
    );

    let mut reports = Vec::new();
    let result = run_cycles(&scenario, &mut built, &mut planner, args.replay, &mut reports);
    planner.terminate(&mut built.graph);

    // Plans computed before a failure are still worth showing.
    print!("{}", render(&reports, args.format)?);
    result
}

fn run_cycles(
    scenario: &Scenario,
    built: &mut ScenarioGraph,
    planner: &mut DStarPlanner<u32>,
    replay: bool,
    reports: &mut Vec<PlanReport>,
) -> Result<()> {
    reports.push(plan_once(planner, built, None)?);
    if !replay {
        return Ok(());
    }

    for event in &scenario.events {
        let effect = built
            .apply(event)
            .with_context(|| format!("failed to apply event '{event}'"))?;
        if let EventEffect::MoveSource(node) = effect {
            planner
                .set_source(&built.graph, node)
                .map_err(|error| describe(error, built))?;
        }
        tracing::debug!(event = %event, "applied scenario event");

        let report = plan_once(planner, built, Some(event.to_string()))
            .with_context(|| format!("replanning failed after event '{event}'"))?;
        reports.push(report);
    }
    Ok(())
}

fn plan_once(
    planner: &mut DStarPlanner<u32>,
    built: &ScenarioGraph,
    event: Option<String>,
) -> Result<PlanReport> {
    let outcome = planner
        .compute(&built.graph)
        .map_err(|error| describe(error, built))?;

    let path: Option<Vec<String>> = match planner.extract_path(built.source) {
        Ok(path) => Some(path.into_iter().map(|id| built.names.label(id)).collect()),
        Err(PlanError::NoPath { .. }) => None,
        Err(error) => return Err(describe(error, built)),
    };

    Ok(PlanReport {
        event,
        source: built.names.label(built.source),
        goal: built.names.label(built.goal),
        cost: path.as_ref().and(planner.path_cost(built.source)),
        path,
        steps: outcome.steps,
    })
}

/// Swap graph ids in planner errors for scenario node names.
fn describe(error: PlanError, built: &ScenarioGraph) -> anyhow::Error {
    match error {
        PlanError::GoalRemoved { .. } => anyhow!(
            "goal {} was removed from the graph",
            built.names.label(built.goal)
        ),
        PlanError::PositionRemoved { .. } => anyhow!(
            "current position {} was removed from the graph",
            built.names.label(built.source)
        ),
        PlanError::UnknownNode { node } => {
            let label = node
                .parse::<u32>()
                .map(|id| built.names.label(id))
                .unwrap_or(node);
            anyhow!("node {label} is not part of the graph")
        }
        other => anyhow::Error::new(other),
    }
}
