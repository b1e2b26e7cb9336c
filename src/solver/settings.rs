use crate::algebra::*;
use crate::timers::ClockType;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// An error attributable to one of the fields
    #[error("Bad value for field \"{0}\"")]
    BadField(&'static str),
}

/// Whether to test the Slater condition before solving and how to
/// report a failed test.
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SlaterCheck {
    #[default]
    Off,
    /// check and log the result
    Check,
    /// check and print a message if the condition fails
    Print,
}

impl SlaterCheck {
    pub(crate) fn from_int(v: i32) -> Option<Self> {
        match v {
            0 => Some(SlaterCheck::Off),
            1 => Some(SlaterCheck::Check),
            2 => Some(SlaterCheck::Print),
            _ => None,
        }
    }
}

/// Settings of the interface layer.  Tolerances are also handed
/// to the backend when a solver is attached.

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SdpiSettings<T: FloatT> {
    ///tolerance for equality and for treating a bound difference as zero
    #[builder(default = "(1e-9).as_T()")]
    pub epsilon: T,

    ///duality gap tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub gaptol: T,

    ///feasibility tolerance
    #[builder(default = "(1e-6).as_T()")]
    pub feastol: T,

    ///starting penalty parameter of the penalty formulation
    #[builder(default = "(1e5).as_T()")]
    pub penaltyparam: T,

    ///maximum penalty parameter
    #[builder(default = "(1e10).as_T()")]
    pub maxpenaltyparam: T,

    ///the penalty formulation proves infeasibility if its optimal value
    ///exceeds this multiple of max(feastol, gaptol)
    #[builder(default = "(10.0).as_T()")]
    pub peninfeasadjust: T,

    ///number of penalty parameter increases before reaching the maximum
    #[builder(default = "8")]
    pub npenaltyincr: u32,

    ///Slater condition testing
    #[builder(default = "SlaterCheck::Off")]
    pub slatercheck: SlaterCheck,

    ///time source for the solve time limit
    #[builder(default = "ClockType::Wall")]
    pub clock_type: ClockType,

    ///print statistics after each solve
    #[builder(default = "false")]
    pub verbose: bool,

    ///keep eigenvectors of the fixed point check for primal recovery
    #[builder(default = "false")]
    pub allfixed_primal_ray: bool,
}

impl<T> Default for SdpiSettings<T>
where
    T: FloatT,
{
    fn default() -> SdpiSettings<T> {
        SdpiSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> SdpiSettings<T>
where
    T: FloatT,
{
    /// Checks that tolerances are positive and the penalty
    /// parameters are ordered.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_positive(self.epsilon, "epsilon")?;
        validate_positive(self.gaptol, "gaptol")?;
        validate_positive(self.feastol, "feastol")?;
        validate_positive(self.penaltyparam, "penaltyparam")?;
        validate_positive(self.maxpenaltyparam, "maxpenaltyparam")?;
        validate_positive(self.peninfeasadjust, "peninfeasadjust")?;
        if self.penaltyparam > self.maxpenaltyparam {
            return Err(SettingsError::BadField("penaltyparam"));
        }
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for SdpiSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        SdpiSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> SdpiSettingsBuilder<T>
where
    T: FloatT,
{
    pub fn validate(&self) -> Result<(), SettingsError> {
        let defaults = |v: &Option<T>, d: f64| v.unwrap_or_else(|| d.as_T());

        validate_positive(defaults(&self.epsilon, 1e-9), "epsilon")?;
        validate_positive(defaults(&self.gaptol, 1e-4), "gaptol")?;
        validate_positive(defaults(&self.feastol, 1e-6), "feastol")?;
        validate_positive(defaults(&self.peninfeasadjust, 10.0), "peninfeasadjust")?;

        let pen = defaults(&self.penaltyparam, 1e5);
        let maxpen = defaults(&self.maxpenaltyparam, 1e10);
        validate_positive(pen, "penaltyparam")?;
        validate_positive(maxpen, "maxpenaltyparam")?;
        if pen > maxpen {
            return Err(SettingsError::BadField("penaltyparam"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_positive<T: FloatT>(v: T, field: &'static str) -> Result<(), SettingsError> {
    if v > T::zero() && v.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::BadField(field))
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    let settings = SdpiSettingsBuilder::<f64>::default().build().unwrap();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.npenaltyincr, 8);
    assert_eq!(settings.slatercheck, SlaterCheck::Off);

    // fail on nonpositive tolerance
    assert!(SdpiSettingsBuilder::<f64>::default()
        .feastol(0.0)
        .build()
        .is_err());

    // fail on penalty above the default maximum
    assert!(SdpiSettingsBuilder::<f64>::default()
        .penaltyparam(1e12)
        .build()
        .is_err());

    // unless the maximum is raised too
    assert!(SdpiSettingsBuilder::<f64>::default()
        .penaltyparam(1e12)
        .maxpenaltyparam(1e13)
        .build()
        .is_ok());

    let mut settings = SdpiSettings::<f64>::default();
    settings.gaptol = f64::NAN;
    assert_eq!(settings.validate(), Err(SettingsError::BadField("gaptol")));
}
