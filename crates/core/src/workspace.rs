//! Apply and tear down a workspace spec.
//!
//! A [`Workspace`] ties a [`Driver`] to an action [`Registry`]. Applying a
//! spec runs in two phases:
//!
//! 1. Windows are found or created, options and layouts applied, and missing
//!    panes split off, one step at a time since split order decides pane
//!    indexes.
//! 2. Every pane's command list is started as its own task. All tasks run to
//!    completion and every failure is reported in [`Error::PaneFailures`].

use std::sync::Arc;

use serde::Serialize;
use serde_yaml::Value;

use crate::{
    actions::{self, PaneContext, Registry},
    error::{Error, PaneFailure, Result},
    interpret::{PaneDescriptor, WindowDescriptor, interpret},
    reconcile::reconcile,
    spec::LAYOUT_KEY,
    tmux::{Driver, PANE_BASE_INDEX, WindowOptions, default_window_options},
    validate::validate,
};

/// Layout for a window split into `panes` panes when none is configured
pub fn default_layout(panes: usize) -> &'static str {
    if panes <= 3 { "even-vertical" } else { "tiled" }
}

/// What a spec resolves to against the live server, without side effects.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub windows: Vec<WindowDescriptor>,
    /// Root options, `layout` included
    pub options: WindowOptions,
}

/// A window after it has been found or created.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedWindow {
    pub name: String,
    pub index: u32,
    /// The window did not exist before this call
    pub created: bool,
    pub panes: Vec<AppliedPane>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppliedPane {
    pub title: String,
    pub index: u32,
    /// The pane was split off (or is the first pane of a new window)
    pub created: bool,
    pub item: Option<String>,
    #[serde(skip)]
    command: Value,
}

/// Outcome of a successful [`Workspace::apply`].
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub windows: Vec<AppliedWindow>,
}

impl ApplyReport {
    pub fn created_windows(&self) -> usize {
        self.windows.iter().filter(|w| w.created).count()
    }

    pub fn created_panes(&self) -> usize {
        self.windows
            .iter()
            .flat_map(|w| &w.panes)
            .filter(|p| p.created)
            .count()
    }

    pub fn pane_count(&self) -> usize {
        self.windows.iter().map(|w| w.panes.len()).sum()
    }
}

fn resolved(index: Option<u32>, what: &str) -> Result<u32> {
    index.ok_or_else(|| Error::Driver(format!("{} has no index after reconciliation", what)))
}

pub struct Workspace {
    driver: Arc<dyn Driver>,
    registry: Arc<Registry>,
}

impl Workspace {
    /// Workspace using the process-wide action registry
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self::with_registry(driver, actions::registry())
    }

    pub fn with_registry(driver: Arc<dyn Driver>, registry: Arc<Registry>) -> Self {
        Self { driver, registry }
    }

    pub fn validate(&self, spec: &Value) -> Result<()> {
        validate(spec, &self.registry)
    }

    /// Validate `spec` and resolve it against the live panes.
    pub async fn plan(&self, spec: &Value) -> Result<Plan> {
        self.validate(spec)?;
        let existing = self.driver.list_panes().await?;
        let (windows, options) = interpret(spec, &existing)?;
        Ok(Plan { windows, options })
    }

    /// Create what is missing and run every pane's commands.
    ///
    /// With `focus`, the first window (found windows first, then created
    /// ones) is selected.
    pub async fn apply(&self, spec: &Value, focus: bool) -> Result<ApplyReport> {
        let Plan {
            windows,
            options: mut root_options,
        } = self.plan(spec).await?;
        let root_layout = root_options
            .shift_remove(LAYOUT_KEY)
            .map(|layout| layout.to_string());

        let (found, created) = reconcile(
            windows,
            |w| w.index.is_some(),
            |w| self.create_window(w),
        )
        .await?;

        let found = found.into_iter().map(|w| (w, false));
        let created = created.into_iter().map(|w| (w, true));
        let mut applied = Vec::new();
        for (position, (window, is_new)) in found.chain(created).enumerate() {
            applied.push(
                self.prepare_window(
                    window,
                    is_new,
                    &root_options,
                    root_layout.as_deref(),
                    focus && position == 0,
                )
                .await?,
            );
        }

        self.run_panes(&applied).await?;
        Ok(ApplyReport { windows: applied })
    }

    /// Kill every window of `spec` that currently exists.
    ///
    /// Indexes are resolved as [`Workspace::apply`] would and killed highest
    /// first. Returns the killed indexes in that order.
    pub async fn teardown(&self, spec: &Value) -> Result<Vec<u32>> {
        let plan = self.plan(spec).await?;
        let mut indexes: Vec<u32> = plan.windows.iter().filter_map(|w| w.index).collect();
        indexes.sort_unstable();
        indexes.dedup();
        indexes.reverse();

        for &index in &indexes {
            self.driver.kill_window(index).await?;
        }
        Ok(indexes)
    }

    /// Create a missing window and claim its first pane for the first
    /// desired pane.
    async fn create_window(&self, mut window: WindowDescriptor) -> Result<WindowDescriptor> {
        let first_title = window.panes.first().map(|p| p.title.clone());
        let index = self
            .driver
            .create_window(&window.name, first_title.as_deref(), &default_window_options())
            .await?;

        window.index = Some(index);
        if let Some(first) = window.panes.first_mut() {
            first.index = Some(PANE_BASE_INDEX);
        }
        Ok(window)
    }

    /// Split off a pane and re-tile right away so later splits have room.
    async fn split_pane(
        &self,
        window: u32,
        layout: &str,
        mut pane: PaneDescriptor,
    ) -> Result<PaneDescriptor> {
        let index = self.driver.split_window(window, &pane.title).await?;
        self.driver.select_layout(window, layout).await?;
        pane.index = Some(index);
        Ok(pane)
    }

    async fn prepare_window(
        &self,
        window: WindowDescriptor,
        is_new: bool,
        root_options: &WindowOptions,
        root_layout: Option<&str>,
        focus: bool,
    ) -> Result<AppliedWindow> {
        let WindowDescriptor {
            name,
            index,
            panes,
            layout,
            options,
        } = window;
        let index = resolved(index, &name)?;
        let layout = layout.or_else(|| root_layout.map(str::to_string));

        let mut merged = root_options.clone();
        merged.extend(options);
        if !merged.is_empty() {
            self.driver.set_window_options(index, &merged).await?;
        }

        // The first pane of a new window already carries an index but was
        // still created by this call
        let first_created = is_new && !panes.is_empty();
        let split_layout = layout
            .clone()
            .unwrap_or_else(|| default_layout(panes.len()).to_string());
        let (found, split) = reconcile(
            panes,
            |p| p.index.is_some(),
            |p| self.split_pane(index, &split_layout, p),
        )
        .await?;

        if let Some(layout) = &layout
            && split.is_empty()
        {
            self.driver.select_layout(index, layout).await?;
        }

        if focus {
            self.driver.select_window(index).await?;
        }

        let found = found.into_iter().enumerate().map(|(position, pane)| {
            let created = first_created && position == 0;
            (pane, created)
        });
        let split = split.into_iter().map(|pane| (pane, true));
        let panes = found
            .chain(split)
            .map(|(pane, created)| {
                Ok(AppliedPane {
                    index: resolved(pane.index, &pane.title)?,
                    title: pane.title,
                    created,
                    item: pane.item,
                    command: pane.command,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(AppliedWindow {
            name,
            index,
            created: is_new,
            panes,
        })
    }

    /// Start one task per pane, then wait for all of them.
    async fn run_panes(&self, windows: &[AppliedWindow]) -> Result<()> {
        let mut tasks = Vec::new();
        for window in windows {
            for pane in &window.panes {
                let driver = Arc::clone(&self.driver);
                let registry = Arc::clone(&self.registry);
                let (window_index, pane_index) = (window.index, pane.index);
                let command = pane.command.clone();
                let item = pane.item.clone();

                let handle = tokio::spawn(async move {
                    let ctx = PaneContext {
                        driver: driver.as_ref(),
                        window: window_index,
                        pane: pane_index,
                        item: item.as_deref(),
                    };
                    registry.run_commands(&ctx, &command).await
                });
                tasks.push((window, pane, handle));
            }
        }

        let mut failures = Vec::new();
        for (window, pane, handle) in tasks {
            let error = match handle.await {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(e) => Error::Driver(format!("pane task did not complete: {}", e)),
            };
            failures.push(PaneFailure {
                window_name: window.name.clone(),
                window_index: window.index,
                pane_title: pane.title.clone(),
                pane_index: pane.index,
                error,
            });
        }

        if failures.is_empty() {
            Ok(())
        } else {
            failures.sort_by_key(|f| (f.window_index, f.pane_index));
            Err(Error::PaneFailures(failures))
        }
    }
}
