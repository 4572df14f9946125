//! Class-based commands.
//!
//! A [`ClassDefinition`] describes a command as a struct whose fields are
//! options. Each option field is declared with an [`OptionDescriptor`] and a
//! setter; fields declared with [`attribute`](ClassDefinition::attribute)
//! are ordinary state and never become options. [`transform`] turns the
//! definition into a [`ClassAdapter`] whose option parameters feed the
//! normal resolution pipeline, and which builds a fresh instance for every
//! invocation.
//!
//! # Examples
//!
//! ```
//! use slash_schema_command::{transform, ClassDefinition};
//! use slash_schema_core::OptionDescriptor;
//!
//! #[derive(Default)]
//! struct Ping {
//!     message: String,
//! }
//!
//! let definition = ClassDefinition::<Ping, (), String>::from_default("Ping")
//!     .option("message", OptionDescriptor::new("What to send"), |p: &mut Ping, v: String| p.message = v)
//!     .callback(|p, _ctx| p.message);
//!
//! let adapter = transform(definition).unwrap();
//! assert_eq!(adapter.parameters().len(), 1);
//! assert_eq!(adapter.parameters()[0].name, "message");
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use slash_schema_core::{
    Annotation, BindError, BoundArguments, CanonicalOption, FromOptionValue, OptionDescriptor,
    OptionKind, OptionType, OptionValue, ParamDefault, ReflectedParameter, SchemaError,
    SignatureError, Snowflake,
};
use tracing::debug;

use crate::error::InvokeError;

/// Name of the method every class command must define.
pub const CALLBACK_METHOD: &str = "callback";

type Initializer<T> = Arc<dyn Fn() -> Result<T, String> + Send + Sync>;
type Assign<T> = Arc<dyn Fn(&mut T, &BoundArguments) -> Result<(), BindError> + Send + Sync>;
type Method<T, C, R> = Arc<dyn Fn(T, &C) -> R + Send + Sync>;
type Hook<T, C> = Arc<dyn Fn(T, &C) + Send + Sync>;
type ErrorHook<T, C> = Arc<dyn Fn(T, &C, &InvokeError) + Send + Sync>;

/// What an option attribute's setter can hold.
#[derive(Clone, Copy)]
struct Slot {
    admits_absence: bool,
    accepts: fn(&OptionValue) -> bool,
}

impl Slot {
    fn of<V: FromOptionValue>() -> Self {
        Self {
            admits_absence: V::from_absent().is_some(),
            accepts: |value| V::from_value(value).is_some(),
        }
    }

    fn check(&self, attribute: &str, option: &CanonicalOption) -> Result<(), SchemaError> {
        let fail = |reason: String| {
            Err(SchemaError::OptionConfig {
                option: option.name.clone(),
                reason,
            })
        };

        if !option.required && option.default.is_none() && !self.admits_absence {
            return fail(format!(
                "attribute `{attribute}` is optional without a default but its type cannot be absent"
            ));
        }
        if !(self.accepts)(&sample(option.kind)) {
            return fail(format!(
                "attribute `{attribute}` cannot hold a {} value",
                option.kind
            ));
        }
        if let Some(default) = &option.default {
            if !(self.accepts)(default) {
                return fail(format!(
                    "attribute `{attribute}` cannot hold its default {default:?}"
                ));
            }
        }
        Ok(())
    }
}

/// A representative bound value of `kind`.
fn sample(kind: OptionKind) -> OptionValue {
    let id = Snowflake(0);
    match kind {
        OptionKind::String => OptionValue::String(String::new()),
        OptionKind::Integer => OptionValue::Integer(0),
        OptionKind::Number => OptionValue::Number(0.5),
        OptionKind::Boolean => OptionValue::Boolean(false),
        OptionKind::User => OptionValue::User(id),
        OptionKind::Channel => OptionValue::Channel(id),
        OptionKind::Role => OptionValue::Role(id),
        OptionKind::Mentionable => OptionValue::Mentionable(id),
        OptionKind::Attachment => OptionValue::Attachment(id),
    }
}

enum Member<T> {
    Option {
        name: String,
        annotation: Annotation,
        descriptor: OptionDescriptor,
        assign: Assign<T>,
        slot: Slot,
    },
    Plain {
        name: String,
    },
}

impl<T> Member<T> {
    fn name(&self) -> &str {
        match self {
            Member::Option { name, .. } | Member::Plain { name } => name,
        }
    }
}

/// Declaration of a class-based command over instance type `T`, invoked
/// with context `C` and producing `R`.
pub struct ClassDefinition<T, C, R = ()> {
    class: String,
    doc: Option<String>,
    initializer: Initializer<T>,
    members: Vec<Member<T>>,
    callback: Option<Method<T, C, R>>,
    pre_run: Option<Hook<T, C>>,
    post_run: Option<Hook<T, C>>,
    on_error: Option<ErrorHook<T, C>>,
}

impl<T: 'static, C: 'static, R: 'static> ClassDefinition<T, C, R> {
    /// Starts a definition whose instances come from the zero-argument
    /// `initializer`.
    pub fn new<F>(class: &str, initializer: F) -> Self
    where
        F: Fn() -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            class: class.to_string(),
            doc: None,
            initializer: Arc::new(initializer),
            members: Vec::new(),
            callback: None,
            pre_run: None,
            post_run: None,
            on_error: None,
        }
    }

    /// Starts a definition whose instances come from [`Default`].
    pub fn from_default(class: &str) -> Self
    where
        T: Default,
    {
        Self::new(class, || Ok(T::default()))
    }

    /// Sets the class doc string, used as the command description.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Declares an option attribute.
    ///
    /// The option kind is inferred from `V` unless the descriptor carries a
    /// kind hint. At invocation `setter` receives the bound value, or `V`'s
    /// absent value for unset optional options. Declaring the command fails
    /// when `V` cannot hold the resolved kind, or when the option may be
    /// absent without a default and `V` has no absent value.
    pub fn option<V, S>(mut self, attribute: &str, descriptor: OptionDescriptor, setter: S) -> Self
    where
        V: OptionType + FromOptionValue + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let parameter = attribute.to_string();
        let assign: Assign<T> = Arc::new(move |instance: &mut T, args: &BoundArguments| {
            setter(instance, args.get::<V>(&parameter)?);
            Ok(())
        });

        self.members.push(Member::Option {
            name: attribute.to_string(),
            annotation: V::annotation(),
            descriptor,
            assign,
            slot: Slot::of::<V>(),
        });
        self
    }

    /// Declares a plain attribute. Plain attributes are not options.
    pub fn attribute(mut self, name: &str) -> Self {
        self.members.push(Member::Plain {
            name: name.to_string(),
        });
        self
    }

    /// Sets the `callback` method.
    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(T, &C) -> R + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Sets a hook run on its own instance before `callback`.
    pub fn pre_run_callback<F>(mut self, hook: F) -> Self
    where
        F: Fn(T, &C) + Send + Sync + 'static,
    {
        self.pre_run = Some(Arc::new(hook));
        self
    }

    /// Sets a hook run on its own instance after `callback`.
    pub fn post_run_callback<F>(mut self, hook: F) -> Self
    where
        F: Fn(T, &C) + Send + Sync + 'static,
    {
        self.post_run = Some(Arc::new(hook));
        self
    }

    /// Sets a hook run on a fresh instance when binding or instantiation
    /// fails for this command.
    ///
    /// The failed invocation still returns its error. The hook is skipped
    /// if the initializer fails again.
    pub fn error_callback<F>(mut self, hook: F) -> Self
    where
        F: Fn(T, &C, &InvokeError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }
}

/// Turns a class definition into a callable adapter.
///
/// Option attributes become reflected parameters in declaration order,
/// positions starting at 1.
///
/// # Errors
///
/// - [`SchemaError::ClassInit`] when the initializer fails.
/// - [`SchemaError::MissingCallback`] when no `callback` is set.
/// - [`SchemaError::Signature`] when two attributes share a name.
pub fn transform<T, C, R>(definition: ClassDefinition<T, C, R>) -> Result<ClassAdapter<T, C, R>, SchemaError>
where
    T: 'static,
    C: 'static,
    R: 'static,
{
    let ClassDefinition {
        class,
        doc,
        initializer,
        members,
        callback,
        pre_run,
        post_run,
        on_error,
    } = definition;

    if let Err(reason) = initializer() {
        return Err(SchemaError::ClassInit { class, reason });
    }

    let callback = callback.ok_or_else(|| SchemaError::MissingCallback {
        class: class.clone(),
        method: CALLBACK_METHOD.to_string(),
    })?;

    let mut seen = HashSet::new();
    let mut params = Vec::new();
    let mut assigns = Vec::new();
    let mut slots = Vec::new();

    for member in members {
        if !seen.insert(member.name().to_string()) {
            return Err(SignatureError::DuplicateParameter(member.name().to_string()).into());
        }
        match member {
            Member::Option {
                name,
                annotation,
                descriptor,
                assign,
                slot,
            } => {
                params.push(ReflectedParameter::new(
                    params.len() + 1,
                    &name,
                    Some(annotation),
                    ParamDefault::Descriptor(descriptor),
                ));
                assigns.push(assign);
                slots.push(slot);
            }
            Member::Plain { name } => {
                debug!(class = %class, attribute = %name, "Skipping plain attribute");
            }
        }
    }

    debug!(class = %class, options = params.len(), "Transformed class command");

    Ok(ClassAdapter {
        class,
        doc,
        params,
        initializer,
        assigns,
        slots,
        callback,
        pre_run,
        post_run,
        on_error,
    })
}

/// A class command ready to be invoked.
pub struct ClassAdapter<T, C, R = ()> {
    class: String,
    doc: Option<String>,
    params: Vec<ReflectedParameter>,
    initializer: Initializer<T>,
    assigns: Vec<Assign<T>>,
    slots: Vec<Slot>,
    callback: Method<T, C, R>,
    pre_run: Option<Hook<T, C>>,
    post_run: Option<Hook<T, C>>,
    on_error: Option<ErrorHook<T, C>>,
}

impl<T, C, R> ClassAdapter<T, C, R> {
    /// Name of the class.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The class doc string, if any.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// The synthetic parameter list, one entry per option attribute.
    pub fn parameters(&self) -> &[ReflectedParameter] {
        &self.params
    }

    /// Checks resolved options against the attribute setters that receive
    /// them.
    ///
    /// `options` are matched to attributes by parameter name.
    ///
    /// # Errors
    ///
    /// [`SchemaError::OptionConfig`] when an attribute's type cannot hold
    /// its option's kind or default, or cannot represent an absent optional
    /// option.
    pub fn check_options(&self, options: &[CanonicalOption]) -> Result<(), SchemaError> {
        for (param, slot) in self.params.iter().zip(&self.slots) {
            if let Some(option) = options.iter().find(|o| o.binding_name() == param.name) {
                slot.check(&param.name, option)?;
            }
        }
        Ok(())
    }

    /// Whether an error hook is set.
    pub fn has_error_callback(&self) -> bool {
        self.on_error.is_some()
    }

    /// Runs the error hook, if any, on a fresh instance.
    pub fn report_error(&self, ctx: &C, error: &InvokeError) {
        let Some(on_error) = &self.on_error else {
            return;
        };
        match (self.initializer)() {
            Ok(instance) => on_error(instance, ctx, error),
            Err(reason) => {
                debug!(class = %self.class, reason = %reason, "Skipping error hook");
            }
        }
    }

    fn instantiate(&self, args: &BoundArguments) -> Result<T, InvokeError> {
        let mut instance = (self.initializer)().map_err(|reason| InvokeError::ClassInit {
            class: self.class.clone(),
            reason,
        })?;
        for assign in &self.assigns {
            assign(&mut instance, args)?;
        }
        Ok(instance)
    }

    /// Creates a fresh instance, assigns the bound options in declaration
    /// order, and calls `callback` on it. Hooks get instances of their own.
    ///
    /// A failure is passed to the error hook before it is returned.
    ///
    /// # Errors
    ///
    /// [`InvokeError::ClassInit`] when the initializer fails, or
    /// [`InvokeError::Bind`] when a bound value does not fit its attribute.
    pub fn invoke(&self, ctx: &C, args: &BoundArguments) -> Result<R, InvokeError> {
        self.run(ctx, args).inspect_err(|err| self.report_error(ctx, err))
    }

    fn run(&self, ctx: &C, args: &BoundArguments) -> Result<R, InvokeError> {
        if let Some(pre_run) = &self.pre_run {
            pre_run(self.instantiate(args)?, ctx);
        }

        let result = (self.callback)(self.instantiate(args)?, ctx);

        if let Some(post_run) = &self.post_run {
            post_run(self.instantiate(args)?, ctx);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use slash_schema_core::{OptionKind, OptionValue, SchemaError};

    use super::*;

    #[derive(Default)]
    struct Greet {
        name: String,
        times: i64,
    }

    fn greet() -> ClassDefinition<Greet, (), String> {
        ClassDefinition::from_default("Greet")
            .option("name", OptionDescriptor::new("Who"), |g: &mut Greet, v: String| g.name = v)
            .attribute("cache")
            .option(
                "times",
                OptionDescriptor::new("How often").with_default(1),
                |g: &mut Greet, v: i64| g.times = v,
            )
            .callback(|g, _ctx| g.name.repeat(g.times as usize))
    }

    fn args(values: Vec<(&str, Option<OptionValue>)>) -> BoundArguments {
        BoundArguments::from_values(
            values
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    #[test]
    fn test_options_collected_in_declaration_order() {
        let adapter = transform(greet()).unwrap();
        let names: Vec<_> = adapter.parameters().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["name", "times"]);
        assert_eq!(adapter.parameters()[1].position, 2);
    }

    #[test]
    fn test_missing_callback() {
        let definition = ClassDefinition::<Greet, (), ()>::from_default("Greet");
        assert_eq!(
            transform(definition).err(),
            Some(SchemaError::MissingCallback {
                class: "Greet".into(),
                method: "callback".into(),
            })
        );
    }

    #[test]
    fn test_failing_initializer_rejected_at_declaration() {
        let definition = ClassDefinition::<Greet, (), ()>::new("Greet", || Err("needs a database".into()))
            .callback(|_, _| ());
        assert!(matches!(
            transform(definition),
            Err(SchemaError::ClassInit { reason, .. }) if reason == "needs a database"
        ));
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let definition = greet().attribute("name");
        assert!(matches!(
            transform(definition),
            Err(SchemaError::Signature(SignatureError::DuplicateParameter(name))) if name == "name"
        ));
    }

    #[test]
    fn test_invoke_assigns_values() {
        let adapter = transform(greet()).unwrap();
        let out = adapter
            .invoke(
                &(),
                &args(vec![
                    ("name", Some(OptionValue::String("ab".into()))),
                    ("times", Some(OptionValue::Integer(2))),
                ]),
            )
            .unwrap();
        assert_eq!(out, "abab");
    }

    #[test]
    fn test_fresh_instance_per_invocation() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let definition = ClassDefinition::<Greet, (), ()>::new("Greet", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Greet::default())
        })
        .callback(|_, _| ());

        let adapter = transform(definition).unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 1);

        adapter.invoke(&(), &args(vec![])).unwrap();
        adapter.invoke(&(), &args(vec![])).unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_hooks_run_around_callback() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (pre, main, post) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));

        let definition = ClassDefinition::<Greet, (), ()>::from_default("Greet")
            .pre_run_callback(move |_, _| pre.lock().unwrap().push("pre"))
            .callback(move |_, _| main.lock().unwrap().push("callback"))
            .post_run_callback(move |_, _| post.lock().unwrap().push("post"));

        transform(definition).unwrap().invoke(&(), &args(vec![])).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["pre", "callback", "post"]);
    }

    #[test]
    fn test_error_callback_sees_assignment_failure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let definition = greet().error_callback(move |g: Greet, _ctx: &(), err: &InvokeError| {
            sink.lock().unwrap().push((g.name, err.clone()));
        });

        let adapter = transform(definition).unwrap();
        let err = adapter
            .invoke(
                &(),
                &args(vec![
                    ("name", Some(OptionValue::Integer(5))),
                    ("times", Some(OptionValue::Integer(1))),
                ]),
            )
            .unwrap_err();

        assert!(matches!(err, InvokeError::Bind(BindError::Coercion { .. })));
        assert_eq!(*seen.lock().unwrap(), vec![(String::new(), err)]);
    }

    #[test]
    fn test_error_callback_not_run_on_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let definition = greet().error_callback(move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let adapter = transform(definition).unwrap();
        assert!(adapter.has_error_callback());
        adapter
            .invoke(&(), &args(vec![("name", Some(OptionValue::String("a".into()))), ("times", None)]))
            .unwrap_err();
        adapter
            .invoke(
                &(),
                &args(vec![
                    ("name", Some(OptionValue::String("a".into()))),
                    ("times", Some(OptionValue::Integer(1))),
                ]),
            )
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_check_options_rejects_unholdable_kinds() {
        let definition = ClassDefinition::<Greet, (), ()>::from_default("Greet")
            .option(
                "times",
                OptionDescriptor::new("How often").with_kind(OptionKind::Number),
                |g: &mut Greet, v: i64| g.times = v,
            )
            .callback(|_, _| ());
        let adapter = transform(definition).unwrap();

        let number = CanonicalOption::new("times", OptionKind::Number, "How often");
        assert!(matches!(
            adapter.check_options(&[number]),
            Err(SchemaError::OptionConfig { option, .. }) if option == "times"
        ));

        let integer = CanonicalOption::new("times", OptionKind::Integer, "How often");
        assert!(adapter.check_options(&[integer]).is_ok());
    }

    #[test]
    fn test_check_options_rejects_absent_without_default() {
        let definition = ClassDefinition::<Greet, (), ()>::from_default("Greet")
            .option(
                "name",
                OptionDescriptor::new("Who").with_required(false),
                |g: &mut Greet, v: String| g.name = v,
            )
            .callback(|_, _| ());
        let adapter = transform(definition).unwrap();

        let optional = CanonicalOption::new("name", OptionKind::String, "Who").with_default(None);
        assert!(matches!(
            adapter.check_options(&[optional]),
            Err(SchemaError::OptionConfig { option, .. }) if option == "name"
        ));

        let defaulted = CanonicalOption::new("name", OptionKind::String, "Who")
            .with_default(Some("anon".into()));
        assert!(adapter.check_options(&[defaulted]).is_ok());
    }

    #[test]
    fn test_optional_setter_admits_absence() {
        let definition = ClassDefinition::<Greet, (), ()>::from_default("Greet")
            .option(
                "name",
                OptionDescriptor::new("Who").with_required(false),
                |g: &mut Greet, v: Option<String>| g.name = v.unwrap_or_default(),
            )
            .callback(|_, _| ());
        let adapter = transform(definition).unwrap();

        let optional = CanonicalOption::new("name", OptionKind::String, "Who").with_default(None);
        assert!(adapter.check_options(&[optional]).is_ok());
    }

    #[test]
    fn test_raw_value_setter_holds_any_kind() {
        let definition = ClassDefinition::<Greet, (), ()>::from_default("Greet")
            .option(
                "times",
                OptionDescriptor::new("How often").with_kind(OptionKind::Number),
                |g: &mut Greet, v: OptionValue| g.times = i64::from(v == OptionValue::Number(2.0)),
            )
            .callback(|_, _| ());
        let adapter = transform(definition).unwrap();

        let number = CanonicalOption::new("times", OptionKind::Number, "How often");
        assert!(adapter.check_options(&[number]).is_ok());
    }

    #[test]
    fn test_initializer_failure_at_invocation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let definition = ClassDefinition::<Greet, (), ()>::new("Greet", move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(Greet::default())
            } else {
                Err("gone".into())
            }
        })
        .callback(|_, _| ());

        let adapter = transform(definition).unwrap();
        assert_eq!(
            adapter.invoke(&(), &args(vec![])),
            Err(InvokeError::ClassInit {
                class: "Greet".into(),
                reason: "gone".into(),
            })
        );
    }
}
