//! Release families of the engine API.
//!
//! Engine releases disagree on how a configuration is handed over and on the
//! name of the class path binding. Each family is one [`EngineApi`]
//! implementation; [`select_api`] picks the family a runtime supports.

use std::path::Path;

use lintbridge_config::RuleConfig;
use tracing::debug;

use crate::runtime::{EngineInstance, EngineRuntime, ExecutionContext};
use crate::wire::{self, ClassPathRequest, ProcessRequest};
use crate::{AuditEvent, EngineFault};

pub const PROCESS: &str = "process";
pub const DESTROY: &str = "destroy";
pub const LOAD_CONFIGURATION: &str = "load_configuration";
pub const LOAD_CONFIGURATION_STREAM: &str = "load_configuration_stream";
pub const SET_CLASS_LOADER: &str = "set_class_loader";
pub const SET_CLASSLOADER: &str = "set_classloader";

/// Every export the bridge may call.
pub const ALL_EXPORTS: &[&str] = &[
    PROCESS,
    DESTROY,
    LOAD_CONFIGURATION,
    LOAD_CONFIGURATION_STREAM,
    SET_CLASS_LOADER,
    SET_CLASSLOADER,
];

/// Failure of one call into the engine.
#[derive(Debug)]
pub enum CallError {
    /// The engine raised an exception.
    Fault(EngineFault),
    /// A payload could not be encoded or decoded.
    Codec(String),
}

impl From<EngineFault> for CallError {
    fn from(fault: EngineFault) -> Self {
        Self::Fault(fault)
    }
}

/// Known release families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseFamily {
    /// Configuration passed as rule XML; `set_classloader`.
    Legacy,
    /// Configuration passed as a structured tree; `set_class_loader`.
    Current,
}

/// Operations whose shape differs between release families.
pub trait EngineApi: Send + Sync {
    fn family(&self) -> ReleaseFamily;

    /// Binds the instance to the class path of the analysed code.
    fn bind_class_path(
        &self,
        instance: &mut dyn EngineInstance,
        context: &ExecutionContext,
    ) -> Result<(), CallError>;

    /// Hands the rule configuration to the instance.
    fn configure(&self, instance: &mut dyn EngineInstance, config: &RuleConfig) -> Result<(), CallError>;

    /// Runs the checks over `files` and returns the audit events.
    fn process(&self, instance: &mut dyn EngineInstance, files: &[&Path]) -> Result<Vec<AuditEvent>, CallError> {
        let request = ProcessRequest {
            files: files.iter().map(|p| p.to_string_lossy().into_owned()).collect(),
        };
        let input = wire::encode(&request).map_err(CallError::Codec)?;
        let output = instance.call(PROCESS, &input)?;
        wire::decode(&output).map_err(CallError::Codec)
    }

    /// Releases engine-side resources, if the release supports it.
    fn destroy(&self, instance: &mut dyn EngineInstance) -> Result<(), CallError>;
}

fn bind_with(
    export: &str,
    instance: &mut dyn EngineInstance,
    context: &ExecutionContext,
) -> Result<(), CallError> {
    let request = ClassPathRequest {
        class_path: context.class_path_strings(),
    };
    let input = wire::encode(&request).map_err(CallError::Codec)?;
    instance.call(export, &input)?;
    Ok(())
}

fn destroy_with(supported: bool, instance: &mut dyn EngineInstance) -> Result<(), CallError> {
    if supported {
        instance.call(DESTROY, &[])?;
    }
    Ok(())
}

/// Releases that take the configuration as an XML stream.
#[derive(Debug)]
pub struct LegacyRelease {
    destroy_supported: bool,
}

impl EngineApi for LegacyRelease {
    fn family(&self) -> ReleaseFamily {
        ReleaseFamily::Legacy
    }

    fn bind_class_path(
        &self,
        instance: &mut dyn EngineInstance,
        context: &ExecutionContext,
    ) -> Result<(), CallError> {
        bind_with(SET_CLASSLOADER, instance, context)
    }

    fn configure(&self, instance: &mut dyn EngineInstance, config: &RuleConfig) -> Result<(), CallError> {
        instance.call(LOAD_CONFIGURATION_STREAM, config.to_xml().as_bytes())?;
        Ok(())
    }

    fn destroy(&self, instance: &mut dyn EngineInstance) -> Result<(), CallError> {
        destroy_with(self.destroy_supported, instance)
    }
}

/// Releases that take the configuration as a structured tree.
#[derive(Debug)]
pub struct CurrentRelease {
    destroy_supported: bool,
}

impl EngineApi for CurrentRelease {
    fn family(&self) -> ReleaseFamily {
        ReleaseFamily::Current
    }

    fn bind_class_path(
        &self,
        instance: &mut dyn EngineInstance,
        context: &ExecutionContext,
    ) -> Result<(), CallError> {
        bind_with(SET_CLASS_LOADER, instance, context)
    }

    fn configure(&self, instance: &mut dyn EngineInstance, config: &RuleConfig) -> Result<(), CallError> {
        let input = wire::encode(config).map_err(CallError::Codec)?;
        instance.call(LOAD_CONFIGURATION, &input)?;
        Ok(())
    }

    fn destroy(&self, instance: &mut dyn EngineInstance) -> Result<(), CallError> {
        destroy_with(self.destroy_supported, instance)
    }
}

/// Picks the API family `runtime` implements, preferring the current one.
pub fn select_api(runtime: &dyn EngineRuntime) -> Option<Box<dyn EngineApi>> {
    let has_all = |exports: &[&str]| exports.iter().all(|e| runtime.has_export(e));
    let destroy_supported = runtime.has_export(DESTROY);

    let api: Box<dyn EngineApi> = if has_all(&[PROCESS, LOAD_CONFIGURATION, SET_CLASS_LOADER]) {
        Box::new(CurrentRelease { destroy_supported })
    } else if has_all(&[PROCESS, LOAD_CONFIGURATION_STREAM, SET_CLASSLOADER]) {
        Box::new(LegacyRelease { destroy_supported })
    } else {
        return None;
    };

    debug!(
        "Engine {} uses the {:?} API",
        runtime.version(),
        api.family()
    );
    Some(api)
}
