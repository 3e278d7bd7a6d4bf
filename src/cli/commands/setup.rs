//! cli::commands::setup
//!
//! Wiring shared by the command handlers: configuration, the signed-in
//! session, the Drive-backed gallery service, and the save step that ends
//! every mutating command.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context as _, Result};

use crate::auth::{GoogleDeviceFlow, SessionManager};
use crate::core::collection::Collection;
use crate::core::config::Config;
use crate::core::types::{GroupId, ImageId};
use crate::engine::{Context, EngineError, GalleryService, SaveOutcome};
use crate::manifest;
use crate::secrets::{self, SecretStore};
use crate::store::drive::DriveStore;
use crate::store::{extract_folder_id, FolderRef};
use crate::ui::output::{self, Verbosity};

/// Build the runtime async commands block on.
pub(super) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start async runtime")
}

pub(super) fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug)
}

pub(super) fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

pub(super) fn secret_store(config: &Config) -> Result<Box<dyn SecretStore>> {
    secrets::create_store(config.secrets_provider()).context("Failed to initialize secret store")
}

/// OAuth client id from the flag, else the config.
pub(super) fn client_id(ctx: &Context, config: &Config) -> Result<String> {
    ctx.client_id
        .as_deref()
        .or(config.client_id())
        .map(str::to_string)
        .ok_or_else(|| {
            anyhow!(
                "No OAuth client id configured.\n\n\
                 Set one with:\n\n    gallerist config set client_id <ID>\n\n\
                 or pass --client-id <ID>."
            )
        })
}

/// Folder from the flag, else the config, else the root folder.
pub(super) fn folder(ctx: &Context, config: &Config) -> FolderRef {
    let id = match ctx.folder.as_deref().map(str::trim) {
        Some(flag) if !flag.is_empty() => Some(extract_folder_id(flag)),
        _ => config.folder_id(),
    };
    FolderRef::from_id(id)
}

/// Session manager over the configured secret store.
pub(super) fn session_manager(
    ctx: &Context,
    config: &Config,
    identity: GoogleDeviceFlow,
) -> Result<SessionManager> {
    let client_id = client_id(ctx, config)?;
    Ok(SessionManager::new(
        &client_id,
        Arc::new(identity),
        secret_store(config)?,
    ))
}

/// Device flow client for the configured OAuth client.
pub(super) fn device_flow(ctx: &Context, config: &Config) -> Result<GoogleDeviceFlow> {
    let client_id = client_id(ctx, config)?;
    Ok(GoogleDeviceFlow::new(&client_id, config.client_secret()))
}

/// Gallery service for the configured folder, signed in via the stored
/// session.
pub(super) fn open_service(ctx: &Context, config: &Config) -> Result<GalleryService> {
    let manager = session_manager(ctx, config, device_flow(ctx, config)?)?;
    let store = DriveStore::new(Arc::new(manager));
    let folder = folder(ctx, config);
    output::debug(format!("Using {}", folder), verbosity(ctx));

    Ok(GalleryService::new(Arc::new(store), folder)
        .with_manifest_name(config.manifest_name())
        .with_default_title(config.default_title()))
}

/// Turn an engine error into a user-facing one, with a sign-in hint when
/// that would help.
pub(super) fn remote_error(err: EngineError) -> anyhow::Error {
    if err.needs_reauth() {
        anyhow!("{}\n\nRun 'gallerist auth login' to sign in again.", err)
    } else {
        anyhow::Error::new(err)
    }
}

/// Load the gallery.
pub(super) async fn load(service: &GalleryService) -> Result<Collection> {
    service.load().await.map_err(remote_error)
}

/// Save the gallery, or print the manifest with `--no-save`.
pub(super) async fn finish(
    ctx: &Context,
    service: &GalleryService,
    collection: &Collection,
    summary: &str,
) -> Result<()> {
    let verbosity = verbosity(ctx);
    if ctx.no_save {
        println!("{}", manifest::to_json(collection)?);
        output::warn("--no-save given; nothing was saved", verbosity);
        return Ok(());
    }

    let outcome = service.save(collection).await.map_err(remote_error)?;
    output::success(summary, verbosity);
    match outcome {
        SaveOutcome::Created(id) => {
            output::debug(format!("Created {} ({})", service.manifest_name(), id), verbosity)
        }
        SaveOutcome::Updated(id) => {
            output::debug(format!("Updated {} ({})", service.manifest_name(), id), verbosity)
        }
    }
    Ok(())
}

/// Resolve a group by id or name.
pub(super) fn resolve_group(collection: &Collection, reference: &str) -> Result<GroupId> {
    collection
        .resolve_group(reference)
        .map(|g| g.id.clone())
        .ok_or_else(|| anyhow!("No group named or with id '{}'.", reference))
}

/// Resolve an image by id, else by a name no other image shares.
pub(super) fn resolve_image(collection: &Collection, reference: &str) -> Result<ImageId> {
    if let Some(image) = collection
        .images()
        .iter()
        .find(|img| img.id.as_str() == reference)
    {
        return Ok(image.id.clone());
    }

    let matches: Vec<&ImageId> = collection
        .images()
        .iter()
        .filter(|img| img.name == reference)
        .map(|img| &img.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok((*id).clone()),
        [] => bail!("No image named or with id '{}'.", reference),
        _ => bail!(
            "{} images are named '{}'; use an id from 'gallerist show'.",
            matches.len(),
            reference
        ),
    }
}
