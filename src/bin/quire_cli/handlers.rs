#![deny(clippy::all, clippy::pedantic)]

use std::process::ExitCode;

use quire::{
    application::{
        curator::{BatchReport, CollectionCurator, SortField, SortOrder},
        pagination::PageMeta,
    },
    config::{CriteriaArgs, ListArgs, ModerationCmd, SelectionArgs, SortKeyArg, UsersCmd},
    domain::{
        entities::{Curatable, UserRecord},
        types::MutationAction,
    },
};
use serde::Serialize;
use tracing::info;

use crate::client::{CliError, Ctx};
use crate::print::{ToastLine, print_json, toast_lines};

/// How a command finished when it did not error out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Clean,
    /// At least one item of a batch failed.
    PartialFailure,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Clean => ExitCode::SUCCESS,
            Status::PartialFailure => ExitCode::from(2),
        }
    }
}

pub async fn users(ctx: &Ctx, cmd: UsersCmd) -> Result<Status, CliError> {
    match cmd {
        UsersCmd::List(args) => list::<UserRecord>(ctx, args).await,
        UsersCmd::Delete(selection) => {
            batch::<UserRecord>(ctx, MutationAction::Delete, selection).await
        }
        UsersCmd::SetRole { role, selection } => {
            batch::<UserRecord>(ctx, MutationAction::SetRole(role), selection).await
        }
    }
}

pub async fn moderate<E: Curatable>(ctx: &Ctx, cmd: ModerationCmd) -> Result<Status, CliError> {
    match cmd {
        ModerationCmd::List(args) => list::<E>(ctx, args).await,
        ModerationCmd::Approve(selection) => batch::<E>(ctx, MutationAction::Approve, selection).await,
        ModerationCmd::Reject(selection) => batch::<E>(ctx, MutationAction::Reject, selection).await,
        ModerationCmd::Delete(selection) => batch::<E>(ctx, MutationAction::Delete, selection).await,
    }
}

#[derive(Serialize)]
struct ListView<'a, E> {
    resource: &'static str,
    meta: PageMeta,
    pages: Vec<Option<u32>>,
    visible: usize,
    items: Vec<&'a E>,
}

async fn list<E: Curatable>(ctx: &Ctx, args: ListArgs) -> Result<Status, CliError> {
    let mut curator = ctx.curator::<E>(args.criteria.page).await?;
    apply_criteria(&mut curator, &args.criteria)?;
    if let Some(key) = args.sort {
        curator.set_sort(Some(sort_order(key, args.desc)));
    }

    let meta = curator.page().meta();
    let items: Vec<&E> = curator.visible().collect();
    print_json(&ListView {
        resource: E::RESOURCE.as_str(),
        meta,
        pages: meta.page_links(),
        visible: items.len(),
        items,
    })?;
    Ok(Status::Clean)
}

#[derive(Serialize)]
struct BatchView<'a> {
    report: &'a BatchReport,
    toasts: Vec<ToastLine>,
}

async fn batch<E: Curatable>(
    ctx: &Ctx,
    action: MutationAction,
    selection: SelectionArgs,
) -> Result<Status, CliError> {
    let mut curator = ctx.curator::<E>(selection.criteria.page).await?;
    apply_criteria(&mut curator, &selection.criteria)?;

    let mut ids = selection.ids;
    if selection.all_matching {
        ids.extend(curator.visible_ids());
    }

    info!(
        resource = E::RESOURCE.as_str(),
        action = %action,
        requested = ids.len(),
        "Dispatching batch"
    );

    let report = curator.dispatch_batch(&ctx.gateway, action, ids).await?;
    let status = if report.is_complete_success() {
        Status::Clean
    } else {
        Status::PartialFailure
    };

    print_json(&BatchView {
        report: &report,
        toasts: toast_lines(curator.drain_toasts()),
    })?;
    Ok(status)
}

fn apply_criteria<E: Curatable>(
    curator: &mut CollectionCurator<E>,
    criteria: &CriteriaArgs,
) -> Result<(), CliError> {
    if let Some(search) = criteria.search.as_deref() {
        curator.set_search_term(search);
    }
    curator.apply_category_filter(criteria.filter.as_deref())?;
    Ok(())
}

fn sort_order(key: SortKeyArg, desc: bool) -> SortOrder {
    let field = match key {
        SortKeyArg::Id => SortField::Id,
        SortKeyArg::Label => SortField::Label,
        SortKeyArg::Created => SortField::CreatedAt,
    };
    if desc {
        SortOrder::descending(field)
    } else {
        SortOrder::ascending(field)
    }
}
