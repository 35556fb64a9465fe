//! Embedding adapter.
//!
//! A host interpreter addresses sampling objects by operation name with a
//! list of loosely typed arguments. [`HostObject`] wraps one shared object
//! and [`HostObject::invoke`] dispatches a named operation to the statically
//! typed API underneath.
//!
//! | Object       | Operations |
//! |--------------|------------|
//! | streamable   | `departure` `arrival` `locate` `reset` `begin` `end` `move` `next` `prev` `getbool` `getlong` `getreal` `forward` `backward` |
//! | spsds        | the streamable set, plus `setridx` `setcidx` `setindx` |
//! | localizer    | `reset` `setlmth` `getlmth` `validate` `locate` `getbool` `getlong` `getreal` |
//! | sampler      | `reset` `validate` `mapbool` `maplong` `mapreal` |
//!
//! Typed reads on a streamable read at the current position with no
//! argument and at the given position with one.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sampler::host::{HostObject, Value};
//! use horizon_sampler::{LocalizationMethod, MemoryTable};
//!
//! let table = Arc::new(MemoryTable::from_column([0.0, 10.0, 20.0, 10.0, 0.0]));
//! let spsds = HostObject::spsds(table);
//! spsds.invoke("setcidx", &[Value::Long(0)])?;
//!
//! let stmdl = HostObject::stmdl(spsds.as_streamable(), LocalizationMethod::AbsoluteForward);
//! let sampler = HostObject::sampler(stmdl.as_localizer(), spsds.as_streamable());
//!
//! sampler.invoke("reset", &[])?;
//! assert_eq!(sampler.invoke("mapreal", &[Value::Real(15.0)])?, Value::Real(10.0));
//! # Ok::<(), horizon_sampler::SampleError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use horizon_sampler_core::{
    LocalizationMethod, Lnrds, Localizer, Position, Result, SampleError, Sampler, Spsds, Stmdl,
    Streamable, Table,
};

/// Log target for host dispatch.
const TARGET: &str = "horizon_sampler::host";

/// A loosely typed argument or result crossing the embedding boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No value.
    #[default]
    Nil,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Long(i64),
    /// A real number or position.
    Real(f64),
    /// A name, such as a localization method.
    Text(String),
}

impl Value {
    /// Check if this value is `Nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Get the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the integer, if this is one.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Get a real number. Integers widen.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Long(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get the text, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// A shared sampling object exposed to a host.
///
/// Cloning a `HostObject` clones the handle, not the object.
#[derive(Clone)]
pub enum HostObject {
    /// A table-addressing streamable, which also accepts index operations.
    Spsds(Arc<Spsds>),
    /// Any other streamable.
    Streamable(Arc<dyn Streamable>),
    /// A localizer.
    Localizer(Arc<dyn Localizer>),
    /// A sampler.
    Sampler(Arc<Sampler>),
}

impl HostObject {
    /// Address `table` in marker mode.
    pub fn spsds(table: Arc<dyn Table>) -> Self {
        Self::Spsds(Arc::new(Spsds::new(table)))
    }

    /// Interpolate `inner`, or stand alone without it.
    pub fn lnrds(inner: Option<Arc<dyn Streamable>>) -> Self {
        Self::Streamable(Arc::new(Lnrds::new(inner)))
    }

    /// Localize over `streamable` with `method`, or stand alone without it.
    pub fn stmdl(streamable: Option<Arc<dyn Streamable>>, method: LocalizationMethod) -> Self {
        Self::Localizer(Arc::new(Stmdl::new(streamable, method)))
    }

    /// Compose a localizer and a streamable. The sampler is not reset.
    pub fn sampler(
        localizer: Option<Arc<dyn Localizer>>,
        streamable: Option<Arc<dyn Streamable>>,
    ) -> Self {
        Self::Sampler(Arc::new(Sampler::new(localizer, streamable)))
    }

    /// The kind of object, as reported in errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Spsds(_) => "spsds",
            Self::Streamable(_) => "streamable",
            Self::Localizer(_) => "localizer",
            Self::Sampler(_) => "sampler",
        }
    }

    /// The object as a streamable, if it is one.
    pub fn as_streamable(&self) -> Option<Arc<dyn Streamable>> {
        match self {
            Self::Spsds(spsds) => Some(spsds.clone()),
            Self::Streamable(streamable) => Some(streamable.clone()),
            _ => None,
        }
    }

    /// The object as a localizer, if it is one.
    pub fn as_localizer(&self) -> Option<Arc<dyn Localizer>> {
        match self {
            Self::Localizer(localizer) => Some(localizer.clone()),
            _ => None,
        }
    }

    /// The object as a sampler, if it is one.
    pub fn as_sampler(&self) -> Option<Arc<Sampler>> {
        match self {
            Self::Sampler(sampler) => Some(sampler.clone()),
            _ => None,
        }
    }

    /// Invoke the operation named `op` with `args`.
    ///
    /// Unknown operations, wrong argument counts and wrong argument kinds
    /// are reported as errors; the object is left untouched in those cases.
    pub fn invoke(&self, op: &str, args: &[Value]) -> Result<Value> {
        tracing::trace!(target: TARGET, object = self.kind(), op, argc = args.len(), "invoke");
        match self {
            Self::Spsds(spsds) => match op {
                "setridx" => {
                    check_arity(op, args, &[1], "1")?;
                    spsds.set_row_index(index_arg(op, &args[0])?);
                    Ok(Value::Nil)
                }
                "setcidx" => {
                    check_arity(op, args, &[1], "1")?;
                    spsds.set_column_index(index_arg(op, &args[0])?);
                    Ok(Value::Nil)
                }
                "setindx" => {
                    check_arity(op, args, &[2], "2")?;
                    let row = optional_index(op, &args[0])?;
                    let column = optional_index(op, &args[1])?;
                    spsds.set_indices(row, column);
                    Ok(Value::Nil)
                }
                _ => invoke_streamable(self.kind(), &**spsds, op, args),
            },
            Self::Streamable(streamable) => {
                invoke_streamable(self.kind(), streamable.as_ref(), op, args)
            }
            Self::Localizer(localizer) => {
                invoke_localizer(self.kind(), localizer.as_ref(), op, args)
            }
            Self::Sampler(sampler) => invoke_sampler(self.kind(), sampler, op, args),
        }
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spsds(spsds) => f.debug_tuple("Spsds").field(spsds).finish(),
            Self::Sampler(sampler) => f.debug_tuple("Sampler").field(sampler).finish(),
            _ => f.debug_tuple(self.kind()).finish_non_exhaustive(),
        }
    }
}

static_assertions::assert_impl_all!(HostObject: Send, Sync);
static_assertions::assert_impl_all!(Value: Send, Sync);

fn invoke_streamable(
    target: &'static str,
    streamable: &dyn Streamable,
    op: &str,
    args: &[Value],
) -> Result<Value> {
    match op {
        "departure" | "arrival" | "locate" | "reset" | "begin" | "end" => {
            check_arity(op, args, &[0], "0")?;
            let pos = match op {
                "departure" => streamable.departure(),
                "arrival" => streamable.arrival(),
                "locate" => streamable.locate(),
                "reset" => streamable.reset(),
                "begin" => streamable.begin(),
                _ => streamable.end(),
            };
            Ok(Value::Real(pos))
        }
        "move" => {
            check_arity(op, args, &[1], "1")?;
            Ok(Value::Real(streamable.move_to(position_arg(op, &args[0])?)))
        }
        "next" => {
            check_arity(op, args, &[0, 1], "0 or 1")?;
            Ok(Value::Real(match args.first() {
                Some(incr) => streamable.next_by(position_arg(op, incr)?),
                None => streamable.next(),
            }))
        }
        "prev" => {
            check_arity(op, args, &[0, 1], "0 or 1")?;
            Ok(Value::Real(match args.first() {
                Some(decr) => streamable.prev_by(position_arg(op, decr)?),
                None => streamable.prev(),
            }))
        }
        "getbool" => {
            check_arity(op, args, &[0, 1], "0 or 1")?;
            Ok(Value::Bool(match args.first() {
                Some(pos) => streamable.get_bool_at(position_arg(op, pos)?)?,
                None => streamable.get_bool()?,
            }))
        }
        "getlong" => {
            check_arity(op, args, &[0, 1], "0 or 1")?;
            Ok(Value::Long(match args.first() {
                Some(pos) => streamable.get_long_at(position_arg(op, pos)?)?,
                None => streamable.get_long()?,
            }))
        }
        "getreal" => {
            check_arity(op, args, &[0, 1], "0 or 1")?;
            Ok(Value::Real(match args.first() {
                Some(pos) => streamable.get_real_at(position_arg(op, pos)?)?,
                None => streamable.get_real()?,
            }))
        }
        "forward" => {
            check_arity(op, args, &[1], "1")?;
            let pos = match &args[0] {
                Value::Bool(v) => streamable.forward_bool(*v)?,
                Value::Long(v) => streamable.forward_long(*v)?,
                Value::Real(v) => streamable.forward(*v)?,
                _ => return Err(SampleError::kind(op, "a boolean or a number")),
            };
            Ok(Value::Real(pos))
        }
        "backward" => {
            check_arity(op, args, &[1], "1")?;
            let pos = match &args[0] {
                Value::Bool(v) => streamable.backward_bool(*v)?,
                Value::Long(v) => streamable.backward_long(*v)?,
                Value::Real(v) => streamable.backward(*v)?,
                _ => return Err(SampleError::kind(op, "a boolean or a number")),
            };
            Ok(Value::Real(pos))
        }
        _ => Err(SampleError::unknown_operation(target, op)),
    }
}

fn invoke_localizer(
    target: &'static str,
    localizer: &dyn Localizer,
    op: &str,
    args: &[Value],
) -> Result<Value> {
    match op {
        "reset" => {
            check_arity(op, args, &[0], "0")?;
            localizer.reset()?;
            Ok(Value::Nil)
        }
        "setlmth" => {
            check_arity(op, args, &[1], "1")?;
            localizer.set_method(method_arg(op, &args[0])?);
            Ok(Value::Nil)
        }
        "getlmth" => {
            check_arity(op, args, &[0], "0")?;
            Ok(Value::Text(localizer.method().name().to_owned()))
        }
        "validate" => {
            check_arity(op, args, &[1], "1")?;
            Ok(Value::Bool(localizer.validate(real_arg(op, &args[0])?)))
        }
        "locate" => {
            check_arity(op, args, &[1], "1")?;
            let pos = match &args[0] {
                Value::Bool(v) => localizer.locate_bool(*v)?,
                Value::Long(v) => localizer.locate_long(*v)?,
                Value::Real(v) => localizer.locate_real(*v)?,
                _ => return Err(SampleError::kind(op, "a boolean or a number")),
            };
            Ok(Value::Real(pos))
        }
        "getbool" => {
            check_arity(op, args, &[1], "1")?;
            Ok(Value::Bool(localizer.get_bool_at(position_arg(op, &args[0])?)?))
        }
        "getlong" => {
            check_arity(op, args, &[1], "1")?;
            Ok(Value::Long(localizer.get_long_at(position_arg(op, &args[0])?)?))
        }
        "getreal" => {
            check_arity(op, args, &[1], "1")?;
            Ok(Value::Real(localizer.get_real_at(position_arg(op, &args[0])?)?))
        }
        _ => Err(SampleError::unknown_operation(target, op)),
    }
}

fn invoke_sampler(
    target: &'static str,
    sampler: &Sampler,
    op: &str,
    args: &[Value],
) -> Result<Value> {
    match op {
        "reset" => {
            check_arity(op, args, &[0], "0")?;
            sampler.reset()?;
            Ok(Value::Nil)
        }
        "validate" => {
            check_arity(op, args, &[1], "1")?;
            Ok(Value::Bool(sampler.validate(real_arg(op, &args[0])?)))
        }
        "mapbool" => {
            check_arity(op, args, &[1], "1")?;
            Ok(Value::Bool(sampler.map_bool(real_arg(op, &args[0])?)?))
        }
        "maplong" => {
            check_arity(op, args, &[1], "1")?;
            Ok(Value::Long(sampler.map_long(real_arg(op, &args[0])?)?))
        }
        "mapreal" => {
            check_arity(op, args, &[1], "1")?;
            Ok(Value::Real(sampler.map_real(real_arg(op, &args[0])?)?))
        }
        _ => Err(SampleError::unknown_operation(target, op)),
    }
}

fn check_arity(op: &str, args: &[Value], counts: &[usize], expected: &'static str) -> Result<()> {
    if counts.contains(&args.len()) {
        Ok(())
    } else {
        Err(SampleError::arity(op, expected, args.len()))
    }
}

fn real_arg(op: &str, value: &Value) -> Result<f64> {
    value.as_real().ok_or_else(|| SampleError::kind(op, "a number"))
}

fn position_arg(op: &str, value: &Value) -> Result<Position> {
    value.as_real().ok_or_else(|| SampleError::kind(op, "a position"))
}

fn index_arg(op: &str, value: &Value) -> Result<usize> {
    value
        .as_long()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| SampleError::kind(op, "a non-negative integer index"))
}

fn optional_index(op: &str, value: &Value) -> Result<Option<usize>> {
    if value.is_nil() {
        Ok(None)
    } else {
        index_arg(op, value).map(Some)
    }
}

/// Methods are accepted by name or by their position in
/// [`LocalizationMethod::ALL`].
fn method_arg(op: &str, value: &Value) -> Result<LocalizationMethod> {
    match value {
        Value::Text(name) => name.parse(),
        Value::Long(ordinal) => usize::try_from(*ordinal)
            .ok()
            .and_then(|i| LocalizationMethod::ALL.get(i).copied())
            .ok_or_else(|| SampleError::unknown_method(ordinal.to_string())),
        _ => Err(SampleError::kind(op, "a method name or ordinal")),
    }
}
