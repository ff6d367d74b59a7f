//! Interactive operator loop and the one-shot render.

use super::boundary::{guard, RenderOutcome};
use super::render::{render_json, render_text, RenderOptions};
use super::session::PresenterSession;
use super::state::{PresenterSnapshot, Selection};
use crate::error::ApiError;
use dialoguer::Select;
use std::panic::AssertUnwindSafe;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    ChangeUser,
    ChangeOrganization,
    Refresh,
    Reload,
    Quit,
}

impl ConsoleAction {
    pub const ALL: [ConsoleAction; 5] = [
        ConsoleAction::ChangeUser,
        ConsoleAction::ChangeOrganization,
        ConsoleAction::Refresh,
        ConsoleAction::Reload,
        ConsoleAction::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConsoleAction::ChangeUser => "Change user",
            ConsoleAction::ChangeOrganization => "Change organization",
            ConsoleAction::Refresh => "Refresh flags",
            ConsoleAction::Reload => "Reload",
            ConsoleAction::Quit => "Quit",
        }
    }
}

/// Render a snapshot inside the panic boundary.
pub fn render_guarded(
    snapshot: &PresenterSnapshot,
    options: &RenderOptions,
    json: bool,
) -> RenderOutcome {
    let snapshot = AssertUnwindSafe(snapshot);
    let options = *options;
    if json {
        guard("json", options.development, move || {
            render_json(&snapshot).unwrap_or_else(|e| e.to_string())
        })
    } else {
        guard("text", options.development, move || render_text(&snapshot, &options))
    }
}

/// Select once and return the rendered view.
pub async fn run_once(
    session: &PresenterSession,
    selection: Selection,
    options: &RenderOptions,
    json: bool,
) -> String {
    if session.snapshot().error.is_none() {
        session.select(selection).await;
    }
    session.sync_live_flags();
    render_guarded(&session.snapshot(), options, json).into_output()
}

fn prompt_select(prompt: &str, items: &[String], default: usize) -> Result<usize, ApiError> {
    tokio::task::block_in_place(|| {
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()
            .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))
    })
}

fn choose_user(session: &PresenterSession) -> Result<Option<Selection>, ApiError> {
    let snapshot = session.snapshot();
    let state = session.state();
    let state = state.lock();
    let Some(catalog) = state.catalog() else {
        return Ok(None);
    };
    let labels: Vec<String> = catalog
        .identities
        .iter()
        .map(|i| format!("{} ({})", i.name, i.role))
        .collect();
    let current = catalog
        .identities
        .iter()
        .position(|i| i.id == snapshot.selection.user_id)
        .unwrap_or(0);
    let ids: Vec<String> = catalog.identities.iter().map(|i| i.id.clone()).collect();
    drop(state);

    let index = prompt_select("User", &labels, current)?;
    Ok(ids
        .get(index)
        .map(|id| Selection::new(id.clone(), snapshot.selection.org_id.clone())))
}

fn choose_organization(session: &PresenterSession) -> Result<Option<Selection>, ApiError> {
    let snapshot = session.snapshot();
    let state = session.state();
    let state = state.lock();
    let Some(catalog) = state.catalog() else {
        return Ok(None);
    };
    let labels: Vec<String> = catalog
        .tenants
        .iter()
        .map(|t| format!("{} ({})", t.name, t.tier))
        .collect();
    let current = catalog
        .tenants
        .iter()
        .position(|t| t.id == snapshot.selection.org_id)
        .unwrap_or(0);
    let ids: Vec<String> = catalog.tenants.iter().map(|t| t.id.clone()).collect();
    drop(state);

    let index = prompt_select("Organization", &labels, current)?;
    Ok(ids
        .get(index)
        .map(|id| Selection::new(snapshot.selection.user_id.clone(), id.clone())))
}

/// Interactive loop. Returns when the operator quits.
pub async fn run_interactive(
    session: &PresenterSession,
    selection: Selection,
    options: &RenderOptions,
) -> Result<(), ApiError> {
    if session.snapshot().error.is_none() {
        session.select(selection).await;
    }

    loop {
        session.sync_live_flags();
        let outcome = render_guarded(&session.snapshot(), options, false);
        let recovered = outcome.is_recovered();
        println!("{}", outcome.into_output());

        let blocked = recovered || session.snapshot().error.is_some();
        let actions: Vec<ConsoleAction> = if blocked {
            vec![ConsoleAction::Reload, ConsoleAction::Quit]
        } else {
            ConsoleAction::ALL.to_vec()
        };
        let labels: Vec<String> = actions.iter().map(|a| a.label().to_string()).collect();
        let index = prompt_select("Action", &labels, 0)?;
        let action = actions.get(index).copied().unwrap_or(ConsoleAction::Quit);
        debug!(?action, "Console action");

        match action {
            ConsoleAction::ChangeUser => {
                if let Some(next) = choose_user(session)? {
                    session.select(next).await;
                }
            }
            ConsoleAction::ChangeOrganization => {
                if let Some(next) = choose_organization(session)? {
                    session.select(next).await;
                }
            }
            ConsoleAction::Refresh => session.refresh().await,
            ConsoleAction::Reload => session.reload().await,
            ConsoleAction::Quit => return Ok(()),
        }
    }
}
