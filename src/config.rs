//! Configuration options the decoding core recognizes.
//!
//! None of these are mutated at runtime once a [`DecodeConfig`] is built;
//! a chunk iterator or a one-off `materialize` call simply borrows one for
//! the duration of the operation.

/// Which [`crate::binder::BinderStrategy`] a `bind` call uses when the
/// caller doesn't pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderStrategy {
    /// Match JSON pairs to target fields by name (default).
    PropertiesNames,
    /// Bind positionally, in target field declaration order.
    PropertiesOrder,
    /// Bind positionally via the target type's single matching constructor.
    Constructor,
}

/// How a decimal may be widened to a floating type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalWideningPolicy {
    /// Refuse widening that would lose precision; callers must stay in `Decimal`.
    LosslessOnly,
    /// Permit an explicit, lossy `f64` fallback.
    AllowDoubleFallback,
}

/// Configuration recognized by the decoding core.
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// When `false`, `StructuredObject`/`Array`/`Map` are returned as `Text` (raw JSON).
    pub structured_types_enabled: bool,
    /// Default binder strategy used when a call site doesn't specify one.
    pub default_strategy: BinderStrategy,
    /// Governs whether `Decimal::to_f64_lossy` may be used implicitly.
    pub decimal_widening_policy: DecimalWideningPolicy,
    /// `PROPERTIES_NAMES` field-name matching is case-insensitive by default;
    /// set `false` for exact matching.
    pub case_insensitive_names: bool,
    /// The connection's session time zone, as a fixed UTC offset in minutes,
    /// used to render `TimestampLtz` values.
    pub session_offset_minutes: i32,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            structured_types_enabled: true,
            default_strategy: BinderStrategy::PropertiesNames,
            decimal_widening_policy: DecimalWideningPolicy::LosslessOnly,
            case_insensitive_names: true,
            session_offset_minutes: 0,
        }
    }
}

/// The time-resolution unit `Time{scale in [4,7]}` values are expressed in
/// internally. Fixed and documented for interoperability; not configurable.
pub const TIME_TICKS_UNIT_NANOS: i64 = 100;
