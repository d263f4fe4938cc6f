//! The stock operation table.
//!
//! One entry per exported symbol. Names follow the `verb` + `noun`
//! convention the Dart side looks symbols up by.

use portbridge_types::{GeneralConfig, NewRemote, RemoteConfig, RemoteOptions};

use crate::{BridgeError, CallArgs, Engine, Operation, OperationRegistry, Param};

const NAME_EMPTY: &str = "name parameter cannot be empty";
const OPTION_EMPTY: &str = "name and key cannot be empty";
const COPY_EMPTY: &str = "source and destination cannot be empty";

const NO_PARAMS: &[Param] = &[];
const PATCH: &[Param] = &[Param::json("patch")];
const NAME: &[Param] = &[Param::identifier("name", NAME_EMPTY)];
const ITEM: &[Param] = &[Param::identifier("name", "itemID cannot be empty")];
const NAME_AND_JSON: &[Param] = &[Param::identifier("name", NAME_EMPTY), Param::json("data")];
const OPTION: &[Param] = &[
    Param::identifier("name", OPTION_EMPTY),
    Param::identifier("key", OPTION_EMPTY),
    Param::text("value"),
];
const COPY: &[Param] = &[
    Param::identifier("source", COPY_EMPTY),
    Param::identifier("destination", COPY_EMPTY),
];

/// Registry holding every stock operation.
pub fn standard_registry() -> OperationRegistry {
    let mut registry = OperationRegistry::new();
    registry.register(Operation::query("getGeneralConfig", NO_PARAMS, get_general_config));
    registry.register(Operation::command("patchGeneralConfig", PATCH, patch_general_config));
    registry.register(Operation::query("listRemotes", NO_PARAMS, list_remotes));
    registry.register(Operation::query("getRemoteConfig", NAME, get_remote_config));
    registry.register(Operation::query("createRemote", NAME_AND_JSON, create_remote));
    registry.register(Operation::command("updateRemoteConfig", NAME_AND_JSON, update_remote_config));
    registry.register(Operation::command("setOption", OPTION, set_option));
    registry.register(Operation::command("copyRemote", COPY, copy_remote));
    registry.register(Operation::command("deleteRemote", ITEM, delete_remote));
    registry
}

fn get_general_config(engine: &dyn Engine, _: &CallArgs) -> Result<GeneralConfig, BridgeError> {
    Ok(engine.general_config()?)
}

fn patch_general_config(engine: &dyn Engine, args: &CallArgs) -> Result<(), BridgeError> {
    let patch: GeneralConfig = args.json(0)?;
    if patch.is_empty() {
        return Ok(());
    }
    Ok(engine.patch_general_config(patch)?)
}

fn list_remotes(engine: &dyn Engine, _: &CallArgs) -> Result<Vec<String>, BridgeError> {
    Ok(engine.list_remotes()?)
}

fn get_remote_config(engine: &dyn Engine, args: &CallArgs) -> Result<RemoteConfig, BridgeError> {
    Ok(engine.remote_config(args.text(0))?)
}

fn create_remote(engine: &dyn Engine, args: &CallArgs) -> Result<RemoteConfig, BridgeError> {
    let remote: NewRemote = args.json(1)?;
    if remote.kind.is_empty() {
        return Err(BridgeError::Validation(
            "remote type cannot be empty".to_string(),
        ));
    }
    Ok(engine.create_remote(args.text(0), remote)?)
}

fn update_remote_config(engine: &dyn Engine, args: &CallArgs) -> Result<(), BridgeError> {
    let options: RemoteOptions = args.json(1)?;
    Ok(engine.update_remote(args.text(0), options)?)
}

fn set_option(engine: &dyn Engine, args: &CallArgs) -> Result<(), BridgeError> {
    Ok(engine.set_option(args.text(0), args.text(1), args.text(2))?)
}

fn copy_remote(engine: &dyn Engine, args: &CallArgs) -> Result<(), BridgeError> {
    Ok(engine.copy_remote(args.text(0), args.text(1))?)
}

fn delete_remote(engine: &dyn Engine, args: &CallArgs) -> Result<(), BridgeError> {
    Ok(engine.delete_remote(args.text(0))?)
}
