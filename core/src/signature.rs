//! Explicit parameter lists and the signature reflector.
//!
//! A [`Signature`] is the declaration-time description of a command
//! callback's parameters: the invocation context first, then one [`Param`]
//! per option. [`reflect`] checks the list and yields the option parameters.
//!
//! ```
//! use slash_schema_core::*;
//!
//! let signature = Signature::new()
//!     .context("ctx")
//!     .param(Param::typed::<String>("text"))
//!     .param(Param::typed::<i64>("times").with_default(1));
//!
//! let params = reflect(&signature).unwrap();
//! assert_eq!(params.len(), 2);
//! assert_eq!(params[0].name, "text");
//! assert_eq!(params[0].position, 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::annotation::{Annotation, OptionType};
use crate::descriptor::OptionDescriptor;
use crate::error::SignatureError;
use crate::types::OptionValue;

/// How a parameter may be passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamKind {
    /// Only positionally.
    PositionalOnly,
    /// Positionally or by keyword (the default).
    #[default]
    PositionalOrKeyword,
    /// Only by keyword.
    KeywordOnly,
    /// Collects any extra positional arguments.
    VarPositional,
    /// Collects any extra keyword arguments.
    VarKeyword,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PositionalOnly => "positional-only",
            Self::PositionalOrKeyword => "positional-or-keyword",
            Self::KeywordOnly => "keyword-only",
            Self::VarPositional => "variadic positional",
            Self::VarKeyword => "variadic keyword",
        })
    }
}

/// The default slot of a parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParamDefault {
    /// No default: the option is required unless a descriptor says otherwise.
    #[default]
    Missing,
    /// A plain default value.
    Value(OptionValue),
    /// An option descriptor carrying explicit metadata.
    Descriptor(OptionDescriptor),
}

impl ParamDefault {
    /// The descriptor, when the default slot holds one.
    pub fn descriptor(&self) -> Option<&OptionDescriptor> {
        match self {
            Self::Descriptor(descriptor) => Some(descriptor),
            _ => None,
        }
    }
}

/// Post-coercion transformation applied to a bound value.
#[derive(Clone)]
pub struct Converter(Arc<dyn Fn(OptionValue) -> Result<OptionValue, String> + Send + Sync>);

impl Converter {
    pub fn new<F>(convert: F) -> Self
    where
        F: Fn(OptionValue) -> Result<OptionValue, String> + Send + Sync + 'static,
    {
        Self(Arc::new(convert))
    }

    /// Applies the conversion.
    pub fn convert(&self, value: OptionValue) -> Result<OptionValue, String> {
        (self.0)(value)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Converter(..)")
    }
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub annotation: Option<Annotation>,
    pub kind: ParamKind,
    pub default: ParamDefault,
    pub converter: Option<Converter>,
}

impl Param {
    /// Creates an unannotated positional-or-keyword parameter.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            annotation: None,
            kind: ParamKind::default(),
            default: ParamDefault::Missing,
            converter: None,
        }
    }

    /// Creates a parameter annotated with the Rust type `T`.
    pub fn typed<T: OptionType>(name: &str) -> Self {
        Self::new(name).with_annotation(T::annotation())
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn with_kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets a plain default value.
    pub fn with_default(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = ParamDefault::Value(value.into());
        self
    }

    /// Attaches an option descriptor as the default slot.
    pub fn with_option(mut self, descriptor: OptionDescriptor) -> Self {
        self.default = ParamDefault::Descriptor(descriptor);
        self
    }

    /// Attaches a converter run on every bound value.
    pub fn with_converter<F>(mut self, convert: F) -> Self
    where
        F: Fn(OptionValue) -> Result<OptionValue, String> + Send + Sync + 'static,
    {
        self.converter = Some(Converter::new(convert));
        self
    }
}

/// The ordered parameter list of a command callback.
///
/// The first parameter is the invocation context and never becomes an
/// option.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    /// Parameters in declaration order, context first.
    pub params: Vec<Param>,
    /// Doc string, used as the command description when none is given.
    pub doc: Option<String>,
    /// Sidecar descriptions keyed by option name.
    pub descriptions: HashMap<String, String>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the context parameter.
    pub fn context(self, name: &str) -> Self {
        self.param(Param::new(name))
    }

    /// Appends a parameter.
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Sets the description of the option named `option`, overriding the
    /// one from its descriptor.
    pub fn describe(mut self, option: &str, description: impl Into<String>) -> Self {
        self.descriptions
            .insert(option.to_string(), description.into());
        self
    }
}

/// A parameter as seen by the option resolver.
#[derive(Debug, Clone)]
pub struct ReflectedParameter {
    /// Index in the full signature; the context is position 0.
    pub position: usize,
    pub name: String,
    pub annotation: Option<Annotation>,
    pub default: ParamDefault,
    pub converter: Option<Converter>,
}

impl ReflectedParameter {
    /// Creates a positional parameter record directly, without a signature.
    pub fn new(position: usize, name: &str, annotation: Option<Annotation>, default: ParamDefault) -> Self {
        Self {
            position,
            name: name.to_string(),
            annotation,
            default,
            converter: None,
        }
    }
}

/// Returns the option parameters of `signature`, context excluded.
///
/// # Errors
///
/// - [`SignatureError::MissingContext`] when the signature is empty.
/// - [`SignatureError::UnsupportedKind`] when the context is keyword-only or
///   variadic, or an option parameter is variadic or positional-only.
/// - [`SignatureError::DuplicateParameter`] when names repeat.
pub fn reflect(signature: &Signature) -> Result<Vec<ReflectedParameter>, SignatureError> {
    let (context, params) = signature
        .params
        .split_first()
        .ok_or(SignatureError::MissingContext)?;

    if !matches!(
        context.kind,
        ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword
    ) {
        return Err(SignatureError::UnsupportedKind {
            parameter: context.name.clone(),
            kind: context.kind,
        });
    }

    let mut seen = HashSet::from([context.name.as_str()]);
    let mut reflected = Vec::with_capacity(params.len());

    for (index, param) in params.iter().enumerate() {
        if !matches!(
            param.kind,
            ParamKind::PositionalOrKeyword | ParamKind::KeywordOnly
        ) {
            return Err(SignatureError::UnsupportedKind {
                parameter: param.name.clone(),
                kind: param.kind,
            });
        }
        if !seen.insert(param.name.as_str()) {
            return Err(SignatureError::DuplicateParameter(param.name.clone()));
        }

        reflected.push(ReflectedParameter {
            position: index + 1,
            name: param.name.clone(),
            annotation: param.annotation.clone(),
            default: param.default.clone(),
            converter: param.converter.clone(),
        });
    }

    Ok(reflected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_signature_has_no_context() {
        assert_eq!(
            reflect(&Signature::new()).unwrap_err(),
            SignatureError::MissingContext
        );
    }

    #[test]
    fn test_context_only_yields_no_parameters() {
        let params = reflect(&Signature::new().context("ctx")).unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_variadic_parameters_are_rejected() {
        for kind in [ParamKind::VarPositional, ParamKind::VarKeyword, ParamKind::PositionalOnly] {
            let signature = Signature::new()
                .context("ctx")
                .param(Param::typed::<String>("rest").with_kind(kind));
            assert_eq!(
                reflect(&signature).unwrap_err(),
                SignatureError::UnsupportedKind {
                    parameter: "rest".into(),
                    kind,
                }
            );
        }
    }

    #[test]
    fn test_keyword_only_parameters_are_accepted() {
        let signature = Signature::new()
            .context("ctx")
            .param(Param::typed::<bool>("flag").with_kind(ParamKind::KeywordOnly));
        assert_eq!(reflect(&signature).unwrap().len(), 1);
    }

    #[test]
    fn test_keyword_only_context_is_rejected() {
        let signature = Signature::new().param(Param::new("ctx").with_kind(ParamKind::KeywordOnly));
        assert!(matches!(
            reflect(&signature),
            Err(SignatureError::UnsupportedKind { .. })
        ));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let signature = Signature::new()
            .context("ctx")
            .param(Param::typed::<String>("ctx"));
        assert_eq!(
            reflect(&signature).unwrap_err(),
            SignatureError::DuplicateParameter("ctx".into())
        );
    }

    #[test]
    fn test_defaults_and_converters_carry_over() {
        let signature = Signature::new().context("ctx").param(
            Param::typed::<String>("word")
                .with_default("hi")
                .with_converter(Ok),
        );
        let params = reflect(&signature).unwrap();
        assert_eq!(params[0].default, ParamDefault::Value("hi".into()));
        assert!(params[0].converter.is_some());
    }
}
