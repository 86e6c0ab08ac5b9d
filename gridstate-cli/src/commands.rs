//! Command implementations.
//!
//! Every command returns the text to print so it can be exercised without a
//! process boundary.

use std::sync::Arc;

use gridstate_core::{
    sanitize, AllowedColumns, GridStateConfig, NewSavedView, RawSnapshot, SavedView, ScopeKey,
    TokenCodec, ViewId,
};
use gridstate_storage::{select_store, ViewStore};
use gridstate_view::{ApplyOutcome, ScreenSpec, ViewController, ViewLocation};
use serde_json::{json, Value};

use crate::cli::{Command, DecodeArgs, EncodeArgs, RenameArgs, SaveArgs, ShareArgs};
use crate::error::CliError;

/// Store and URL settings shared by all commands.
pub struct CommandContext {
    store: Arc<dyn ViewStore>,
    codec: TokenCodec,
    token_param: String,
}

impl CommandContext {
    pub fn new(
        store: Arc<dyn ViewStore>,
        codec: TokenCodec,
        token_param: impl Into<String>,
    ) -> Self {
        Self {
            store,
            codec,
            token_param: token_param.into(),
        }
    }

    pub fn from_config(config: &GridStateConfig) -> Result<Self, CliError> {
        let store = select_store(&config.store)?;
        Ok(Self::new(
            store,
            TokenCodec::new(config.url.max_token_len),
            config.url.token_param.clone(),
        ))
    }

    pub fn store(&self) -> &Arc<dyn ViewStore> {
        &self.store
    }
}

/// Run one command and return its output.
pub async fn run(ctx: &CommandContext, command: Command) -> Result<String, CliError> {
    match command {
        Command::List(args) => list(ctx, &args.scope).await,
        Command::Show(args) => {
            let view = require_view(ctx, &args.scope, args.id).await?;
            Ok(serde_json::to_string_pretty(&view)?)
        }
        Command::Save(args) => save(ctx, args).await,
        Command::Rename(args) => rename(ctx, args).await,
        Command::Delete(args) => {
            require_view(ctx, &args.scope, args.id).await?;
            ctx.store.delete(&args.scope, args.id).await?;
            tracing::info!(scope = %args.scope, view_id = %args.id, "Deleted saved view");
            Ok(format!("deleted {}", args.id))
        }
        Command::SetDefault(args) => {
            require_view(ctx, &args.scope, args.id).await?;
            ctx.store.set_default_id(&args.scope, Some(args.id)).await?;
            tracing::info!(scope = %args.scope, view_id = %args.id, "Set default view");
            Ok(format!("default {}", args.id))
        }
        Command::ClearDefault(args) => {
            ctx.store.set_default_id(&args.scope, None).await?;
            tracing::info!(scope = %args.scope, "Cleared default view");
            Ok("default cleared".to_string())
        }
        Command::Decode(args) => decode(ctx, args),
        Command::Encode(args) => encode(ctx, args),
        Command::Share(args) => share(ctx, args).await,
        Command::ClearScope(args) => {
            let removed = ctx.store.clear_scope(&args.scope).await?;
            tracing::info!(scope = %args.scope, removed, "Cleared scope");
            Ok(format!("removed {removed} records"))
        }
        Command::Stats => stats(ctx),
    }
}

async fn require_view(
    ctx: &CommandContext,
    scope: &ScopeKey,
    id: ViewId,
) -> Result<SavedView, CliError> {
    ctx.store
        .get(scope, id)
        .await?
        .ok_or_else(|| CliError::ViewNotFound {
            scope: scope.to_string(),
            id: id.to_string(),
        })
}

async fn list(ctx: &CommandContext, scope: &ScopeKey) -> Result<String, CliError> {
    let views = ctx.store.list(scope).await;
    let default_id = ctx.store.get_default_id(scope).await?;
    let rows: Vec<Value> = views
        .iter()
        .map(|view| {
            json!({
                "id": view.id,
                "name": view.name,
                "timestamp": view.timestamp,
                "default": Some(view.id) == default_id,
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

async fn save(ctx: &CommandContext, args: SaveArgs) -> Result<String, CliError> {
    let snapshot = match (&args.token, &args.snapshot) {
        (Some(token), _) => ctx
            .codec
            .deserialize(token)
            .ok_or_else(|| CliError::invalid("--token", "not a decodable view token"))?,
        (None, Some(json)) => parse_snapshot_json("--snapshot", json)?,
        (None, None) => return Err(CliError::invalid("--token", "a snapshot is required")),
    };

    let id = ctx
        .store
        .save(&args.scope, NewSavedView::new(args.name.clone(), snapshot))
        .await?;
    tracing::info!(scope = %args.scope, view_id = %id, name = %args.name, "Saved view");
    Ok(id.to_string())
}

async fn rename(ctx: &CommandContext, args: RenameArgs) -> Result<String, CliError> {
    require_view(ctx, &args.scope, args.id).await?;
    ctx.store
        .rename(&args.scope, args.id, args.name.clone())
        .await?;
    tracing::info!(scope = %args.scope, view_id = %args.id, name = %args.name, "Renamed view");
    Ok(format!("renamed {} to {}", args.id, args.name))
}

fn stats(ctx: &CommandContext) -> Result<String, CliError> {
    let Some(stats) = ctx.store.stats() else {
        return Ok("store keeps no statistics".to_string());
    };
    let report = json!({
        "hits": stats.hits,
        "misses": stats.misses,
        "hitRate": stats.hit_rate(),
        "batches": stats.batches,
        "entryCount": stats.entry_count,
    });
    Ok(serde_json::to_string_pretty(&report)?)
}

fn decode(ctx: &CommandContext, args: DecodeArgs) -> Result<String, CliError> {
    let raw = ctx
        .codec
        .deserialize(&args.token)
        .ok_or_else(|| CliError::invalid("TOKEN", "not a decodable view token"))?;
    match args.columns {
        Some(columns) => {
            let snapshot = sanitize(&raw, &AllowedColumns::new(columns));
            Ok(serde_json::to_string_pretty(&snapshot)?)
        }
        None => Ok(serde_json::to_string_pretty(&raw)?),
    }
}

fn encode(ctx: &CommandContext, args: EncodeArgs) -> Result<String, CliError> {
    let raw = parse_snapshot_json("JSON", &args.json)?;
    let allowed = match args.columns {
        Some(columns) => AllowedColumns::new(columns),
        None => named_columns(&raw),
    };
    let token = ctx.codec.serialize(&sanitize(&raw, &allowed));
    if token.is_empty() {
        return Err(CliError::invalid("JSON", "snapshot could not be encoded"));
    }
    Ok(token)
}

async fn share(ctx: &CommandContext, args: ShareArgs) -> Result<String, CliError> {
    let location = ViewLocation::parse(&args.url, ctx.token_param.clone())?;
    let mut spec = ScreenSpec::new(args.scope.clone(), AllowedColumns::new(args.columns));
    if let Some(param) = args.legacy_filter {
        spec = spec.with_legacy_filter(param);
    }

    let controller = ViewController::load(spec, Arc::clone(&ctx.store), location, ctx.codec).await;
    if let Some(id) = args.id {
        if controller.apply_saved_view(id).await? == ApplyOutcome::NotFound {
            return Err(CliError::ViewNotFound {
                scope: args.scope.to_string(),
                id: id.to_string(),
            });
        }
    }
    let shared = controller.shareable_location();
    controller.close();
    Ok(shared.url().to_string())
}

fn parse_snapshot_json(arg: &'static str, json: &str) -> Result<RawSnapshot, CliError> {
    let value: Value = serde_json::from_str(json)?;
    RawSnapshot::from_value(value).ok_or_else(|| CliError::invalid(arg, "must be a JSON object"))
}

/// Column ids named anywhere in `columns.visible` or `columns.order`.
fn named_columns(raw: &RawSnapshot) -> AllowedColumns {
    let Some(columns) = raw.get("columns") else {
        return AllowedColumns::default();
    };
    ["visible", "order"]
        .iter()
        .filter_map(|facet| columns.get(facet).and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_str)
        .collect()
}
