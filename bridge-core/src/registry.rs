//! Operation registry.
//!
//! Every exported symbol maps to one [`Operation`]: its name, its parameter
//! list and a handler. The handler only decodes its arguments and calls the
//! engine; encoding the result, arity checks and panic containment happen
//! here, once, for all operations.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use portbridge_types::Outcome;
use serde::Serialize;

use crate::{BridgeError, CallArgs, Engine};

/// How an operation reads one of its string arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A name that must not be empty; `message` is the validation failure.
    Identifier {
        /// Failure text reported for an empty argument.
        message: &'static str,
    },
    /// Free text, may be empty.
    Text,
    /// A JSON document decoded into the operation's input schema.
    Json,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Identifier { .. } => f.write_str("identifier"),
            ParamKind::Text => f.write_str("text"),
            ParamKind::Json => f.write_str("json"),
        }
    }
}

/// One declared parameter (the call token is implicit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    /// Parameter name, for diagnostics and listings.
    pub name: &'static str,
    /// How the argument is read.
    pub kind: ParamKind,
}

impl Param {
    /// A required identifier, rejected with `message` when empty.
    pub const fn identifier(name: &'static str, message: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Identifier { message },
        }
    }

    /// Free text.
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Text,
        }
    }

    /// A JSON payload.
    pub const fn json(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Json,
        }
    }

    /// Check one argument before the handler sees it.
    pub fn validate(&self, value: &str) -> Result<(), BridgeError> {
        match self.kind {
            ParamKind::Identifier { message } if value.is_empty() => {
                Err(BridgeError::Validation(message.to_string()))
            }
            _ => Ok(()),
        }
    }
}

type Handler =
    Box<dyn Fn(&dyn Engine, &CallArgs) -> Result<Option<String>, BridgeError> + Send + Sync>;

/// A named unit of work reachable from the boundary.
pub struct Operation {
    name: &'static str,
    params: &'static [Param],
    handler: Handler,
}

impl Operation {
    /// An operation whose result is serialized into the envelope's `data`.
    pub fn query<R, F>(name: &'static str, params: &'static [Param], f: F) -> Self
    where
        R: Serialize,
        F: Fn(&dyn Engine, &CallArgs) -> Result<R, BridgeError> + Send + Sync + 'static,
    {
        Self {
            name,
            params,
            handler: Box::new(move |engine: &dyn Engine, args: &CallArgs| {
                let result = f(engine, args)?;
                serde_json::to_string(&result)
                    .map(Some)
                    .map_err(BridgeError::Encode)
            }),
        }
    }

    /// An operation that only has a side effect; `data` stays empty.
    pub fn command<F>(name: &'static str, params: &'static [Param], f: F) -> Self
    where
        F: Fn(&dyn Engine, &CallArgs) -> Result<(), BridgeError> + Send + Sync + 'static,
    {
        Self {
            name,
            params,
            handler: Box::new(move |engine: &dyn Engine, args: &CallArgs| {
                f(engine, args).map(|()| None)
            }),
        }
    }

    /// Exported symbol name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared parameters, token excluded.
    pub fn params(&self) -> &'static [Param] {
        self.params
    }

    /// Human-readable call shape, e.g. `deleteRemote(token, name: identifier)`.
    pub fn signature(&self) -> String {
        let mut parts = vec!["token".to_string()];
        parts.extend(self.params.iter().map(|p| format!("{}: {}", p.name, p.kind)));
        format!("{}({})", self.name, parts.join(", "))
    }

    /// Run the handler, returning the encoded result if any.
    ///
    /// Arity and empty identifiers are rejected before the handler runs. A
    /// panicking handler is reported as [`BridgeError::Panicked`].
    pub fn run(&self, engine: &dyn Engine, args: &CallArgs) -> Result<Option<String>, BridgeError> {
        if args.len() != self.params.len() {
            return Err(BridgeError::Arity {
                operation: self.name.to_string(),
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        for (index, param) in self.params.iter().enumerate() {
            param.validate(args.text(index))?;
        }

        match panic::catch_unwind(AssertUnwindSafe(|| (self.handler)(engine, args))) {
            Ok(result) => result,
            Err(payload) => Err(BridgeError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Operations keyed by exported symbol name.
#[derive(Debug, Default)]
pub struct OperationRegistry {
    operations: BTreeMap<&'static str, Operation>,
}

impl OperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation, replacing any previous one with the same name.
    pub fn register(&mut self, operation: Operation) -> Option<Operation> {
        self.operations.insert(operation.name, operation)
    }

    /// Look up an operation by name.
    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    /// All operations, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Run the named operation and fold every failure into an [`Outcome`].
    pub fn execute(&self, name: &str, engine: &dyn Engine, args: &CallArgs) -> Outcome {
        let result = match self.get(name) {
            Some(operation) => operation.run(engine, args),
            None => Err(BridgeError::UnknownOperation(name.to_string())),
        };

        match result {
            Ok(data) => Outcome::Success { data },
            Err(e) => {
                tracing::debug!("{} failed: {}", name, e);
                Outcome::failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineError, MockEngine};
    use serde::ser::{Error as _, Serializer};

    const ONE: &[Param] = &[Param::identifier("name", "name cannot be empty")];
    const MIXED: &[Param] = &[
        Param::identifier("name", "name cannot be empty"),
        Param::text("note"),
        Param::json("body"),
    ];

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("value cannot be encoded"))
        }
    }

    fn registry() -> OperationRegistry {
        let mut registry = OperationRegistry::new();
        registry.register(Operation::query("echo", ONE, |_: &dyn Engine, args: &CallArgs| {
            Ok(args.text(0).to_string())
        }));
        registry.register(Operation::command("noop", &[], |_: &dyn Engine, _: &CallArgs| Ok(())));
        registry.register(Operation::command("explode", &[], |_: &dyn Engine, _: &CallArgs| {
            panic!("handler bug")
        }));
        registry.register(Operation::query("opaque", &[], |_: &dyn Engine, _: &CallArgs| {
            Ok(Unencodable)
        }));
        registry.register(Operation::command("mixed", MIXED, |_: &dyn Engine, _: &CallArgs| Ok(())));
        registry.register(Operation::command("refuse", &[], |_: &dyn Engine, _: &CallArgs| {
            Err(EngineError::Backend("offline".to_string()).into())
        }));
        registry
    }

    #[test]
    fn query_encodes_result() {
        let outcome = registry().execute("echo", &MockEngine::new(), &CallArgs::from(vec!["hi".to_string()]));
        assert_eq!(outcome, Outcome::with_data("\"hi\"".to_string()));
    }

    #[test]
    fn command_leaves_data_empty() {
        let outcome = registry().execute("noop", &MockEngine::new(), &CallArgs::none());
        assert_eq!(outcome, Outcome::done());
    }

    #[test]
    fn unknown_operation_fails() {
        let outcome = registry().execute("nope", &MockEngine::new(), &CallArgs::none());
        assert_eq!(outcome, Outcome::failure("unknown operation: nope"));
    }

    #[test]
    fn wrong_arity_fails_before_handler() {
        let outcome = registry().execute("echo", &MockEngine::new(), &CallArgs::none());
        assert_eq!(outcome, Outcome::failure("echo expects 1 argument(s), got 0"));
    }

    #[test]
    fn panic_is_contained() {
        let outcome = registry().execute("explode", &MockEngine::new(), &CallArgs::none());
        assert_eq!(outcome, Outcome::failure("operation panicked: handler bug"));
    }

    #[test]
    fn engine_error_becomes_failure() {
        let outcome = registry().execute("refuse", &MockEngine::new(), &CallArgs::none());
        assert_eq!(outcome, Outcome::failure("engine error: offline"));
    }

    #[test]
    fn signature_lists_token_first() {
        let registry = registry();
        assert_eq!(registry.get("echo").unwrap().signature(), "echo(token, name: identifier)");
        assert_eq!(registry.get("noop").unwrap().signature(), "noop(token)");
        assert_eq!(
            registry.get("mixed").unwrap().signature(),
            "mixed(token, name: identifier, note: text, body: json)"
        );
    }

    #[test]
    fn empty_identifier_rejected_with_declared_message() {
        let outcome = registry().execute("echo", &MockEngine::new(), &CallArgs::from(vec![String::new()]));
        assert_eq!(outcome, Outcome::failure("name cannot be empty"));
    }

    #[test]
    fn empty_text_and_json_reach_the_handler() {
        let args: CallArgs = ["s3box", "", ""].into_iter().collect();
        let outcome = registry().execute("mixed", &MockEngine::new(), &args);
        assert_eq!(outcome, Outcome::done());
    }

    #[test]
    fn encode_failure_becomes_failure_without_data() {
        let outcome = registry().execute("opaque", &MockEngine::new(), &CallArgs::none());
        assert_eq!(outcome, Outcome::failure("value cannot be encoded"));

        let envelope = portbridge_types::ResponseEnvelope::from(outcome);
        assert!(!envelope.success);
        assert_eq!(envelope.message, "value cannot be encoded");
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = registry();
        let before = registry.len();
        let old = registry.register(Operation::command("noop", &[], |_: &dyn Engine, _: &CallArgs| Ok(())));
        assert!(old.is_some());
        assert_eq!(registry.len(), before);
    }
}
