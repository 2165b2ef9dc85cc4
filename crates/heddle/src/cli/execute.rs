//! Command execution.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use super::args::{
    CommentArgs, CreateArgs, DepAction, DepArgs, InfoArgs, InitArgs, IssueIdArgs, ListArgs,
    ReadyArgs, ShowArgs, StatusArgs,
};
use crate::app::App;
use crate::config;
use crate::domain::{IssueFilter, IssueId, NewIssue, ReadyFilter};
use crate::output::{self, OutputMode};

/// Execute the init command
pub async fn execute_init(cwd: &Path, args: &InitArgs, mode: OutputMode) -> Result<()> {
    let result = config::init(cwd, args.prefix.as_deref()).await?;

    match mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "heddle_dir": result.heddle_dir.display().to_string(),
            "config_file": result.config_file.display().to_string(),
            "issues_file": result.issues_file.display().to_string(),
            "issue_prefix": result.prefix,
        }))?,
        OutputMode::Text if args.quiet => {}
        OutputMode::Text => {
            println!("Initialized heddle in {}", result.heddle_dir.display());
            println!("  Config: {}", result.config_file.display());
            println!("  Issues: {}", result.issues_file.display());
            println!("  Issue prefix: {}", result.prefix);
        }
    }
    Ok(())
}

/// Execute the info command
pub async fn execute_info(app: &mut App, _args: &InfoArgs, mode: OutputMode) -> Result<()> {
    let heddle_dir = app.heddle_dir().display().to_string();
    let data_file = app
        .backend()
        .data_path()
        .map(|path| path.display().to_string());
    let prefix = app.prefix().to_string();
    let summary = app.service_mut().summary().await?;

    match mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "heddle_dir": heddle_dir,
            "data_file": data_file,
            "issue_prefix": prefix,
            "issues": summary,
        }))?,
        OutputMode::Text => {
            println!("Heddle Repository Information");
            println!("=============================");
            println!();
            println!("Repository:   {heddle_dir}");
            println!(
                "Data file:    {}",
                data_file.as_deref().unwrap_or("(in memory, not persisted)")
            );
            println!("Issue prefix: {prefix}");
            println!();
            println!(
                "Issues: {} total ({} open, {} in progress, {} blocked, {} closed)",
                summary.total, summary.open, summary.in_progress, summary.blocked, summary.closed
            );
            println!("Ready:  {}", summary.ready);
            println!("Dependencies: {}", summary.dependencies);

            let config = output::OutputConfig::from_env();
            if summary.dangling_references > 0 {
                println!(
                    "{}",
                    output::warning(
                        &format!(
                            "{} blocker reference(s) point at missing issues",
                            summary.dangling_references
                        ),
                        &config
                    )
                );
            }
            if !summary.acyclic {
                println!(
                    "{}",
                    output::warning("Dependency cycle detected in stored data", &config)
                );
            }
        }
    }
    Ok(())
}

/// Execute the create command
pub async fn execute_create(app: &mut App, args: &CreateArgs, mode: OutputMode) -> Result<()> {
    let description = match &args.description_file {
        Some(path) => read_description(path).await?,
        None => args.description.clone().unwrap_or_default(),
    };

    let new_issue = NewIssue {
        title: args.title.clone(),
        priority: args.priority,
        issue_type: args.issue_type.into(),
        description,
        design_notes: args.design.clone().unwrap_or_default(),
        acceptance_criteria: args.acceptance_criteria.clone(),
        labels: args.labels.clone(),
        blocked_by: args.blocked_by.iter().map(IssueId::new).collect(),
        parent: args.parent.as_deref().map(IssueId::new),
    };

    let issue = app.service_mut().create_issue(new_issue).await?;

    match mode {
        OutputMode::Json => output::print_json(&issue)?,
        OutputMode::Text => output::print_message(&format!("Created issue: {}", issue.id))?,
    }
    Ok(())
}

/// Read a description from `path`, or from stdin when `path` is `-`.
async fn read_description(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut description = String::new();
        std::io::stdin()
            .read_to_string(&mut description)
            .context("Failed to read description from stdin")?;
        return Ok(description);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read description file: {}", path.display()))
}

/// Execute the show command
pub async fn execute_show(app: &mut App, args: &ShowArgs, mode: OutputMode) -> Result<()> {
    let id = IssueId::new(&args.issue_id);
    let service = app.service_mut();

    let details = service.get_issue_with_dependencies(&id).await?;
    let blockers = service.get_blockers(&id).await?;
    let dependents = service.get_blocked_by_this(&id).await?;

    output::print_issue_details(&details, &blockers, &dependents, args.fetch_deps, mode)?;
    Ok(())
}

/// Execute the list command
pub async fn execute_list(app: &App, args: &ListArgs, mode: OutputMode) -> Result<()> {
    let filter = IssueFilter {
        status: args.status.map(Into::into),
        include_closed: args.all,
        labels: args.labels.clone(),
        issue_type: args.issue_type.map(Into::into),
        limit: args.limit,
    };

    let issues = app.service().list_issues(&filter).await?;
    output::print_issues(&issues, mode)?;
    Ok(())
}

/// Execute the ready command
pub async fn execute_ready(app: &mut App, args: &ReadyArgs, mode: OutputMode) -> Result<()> {
    let filter = ReadyFilter {
        labels: args.labels.clone(),
        issue_type: args.issue_type.map(Into::into),
        limit: args.limit,
    };

    let issues = app.service_mut().get_ready_issues(&filter).await?;
    output::print_issues(&issues, mode)?;
    Ok(())
}

/// Execute the start command
pub async fn execute_start(app: &mut App, args: &IssueIdArgs, mode: OutputMode) -> Result<()> {
    let issue = app
        .service_mut()
        .start_issue(&IssueId::new(&args.issue_id))
        .await?;
    output::print_issue(&issue, mode)?;
    Ok(())
}

/// Execute the status command
pub async fn execute_status(app: &mut App, args: &StatusArgs, mode: OutputMode) -> Result<()> {
    let issue = app
        .service_mut()
        .update_issue_status(&IssueId::new(&args.issue_id), args.status.into())
        .await?;
    output::print_issue(&issue, mode)?;
    Ok(())
}

/// Execute the close command
pub async fn execute_close(app: &mut App, args: &IssueIdArgs, mode: OutputMode) -> Result<()> {
    let outcome = app
        .service_mut()
        .close_issue(&IssueId::new(&args.issue_id))
        .await?;
    output::print_close_outcome(&outcome, mode)?;
    Ok(())
}

/// Execute the comment command
pub async fn execute_comment(app: &mut App, args: &CommentArgs, mode: OutputMode) -> Result<()> {
    let issue = app
        .service_mut()
        .add_comment(&IssueId::new(&args.issue_id), &args.text)
        .await?;

    match mode {
        OutputMode::Json => output::print_json(&issue)?,
        OutputMode::Text => output::print_message(&format!(
            "Added comment to {} ({} total)",
            issue.id,
            issue.comments.len()
        ))?,
    }
    Ok(())
}

/// Execute the dep command
pub async fn execute_dep(app: &mut App, args: &DepArgs, mode: OutputMode) -> Result<()> {
    let service = app.service_mut();

    match &args.action {
        DepAction::Add {
            issue_id,
            blocker_id,
        } => {
            let (issue_id, blocker_id) = (IssueId::new(issue_id), IssueId::new(blocker_id));
            service.add_dependency(&issue_id, &blocker_id).await?;
            print_dep_change("added", &issue_id, &blocker_id, mode)?;
        }
        DepAction::Remove {
            issue_id,
            blocker_id,
        } => {
            let (issue_id, blocker_id) = (IssueId::new(issue_id), IssueId::new(blocker_id));
            service.remove_dependency(&issue_id, &blocker_id).await?;
            print_dep_change("removed", &issue_id, &blocker_id, mode)?;
        }
        DepAction::List { issue_id } => {
            let id = IssueId::new(issue_id);
            let blockers = service.get_blockers(&id).await?;
            let dependents = service.get_blocked_by_this(&id).await?;

            match mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "issue": id,
                    "blocked_by": blockers,
                    "blocks": dependents,
                }))?,
                OutputMode::Text => {
                    let join = |ids: &[IssueId]| {
                        if ids.is_empty() {
                            "(none)".to_string()
                        } else {
                            ids.iter().map(IssueId::as_str).collect::<Vec<_>>().join(", ")
                        }
                    };
                    println!("{id}");
                    println!("  Blocked by: {}", join(&blockers));
                    println!("  Blocks:     {}", join(&dependents));
                }
            }
        }
    }
    Ok(())
}

fn print_dep_change(
    action: &str,
    issue_id: &IssueId,
    blocker_id: &IssueId,
    mode: OutputMode,
) -> std::io::Result<()> {
    match mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "action": action,
            "issue": issue_id,
            "blocked_by": blocker_id,
        })),
        OutputMode::Text => {
            let relation = if action == "added" { "is now" } else { "is no longer" };
            output::print_message(&format!("{issue_id} {relation} blocked by {blocker_id}"))
        }
    }
}
