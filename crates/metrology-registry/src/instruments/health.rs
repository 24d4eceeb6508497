use metrology_core::Instrument;

/// Health checks report whether a dependency is usable right now.
pub trait HealthCheck: Instrument {
    fn check(&self) -> bool;
}

/// Closure-backed health check.
pub struct FnHealthCheck {
    f: Box<dyn Fn() -> bool + Send + Sync>,
}

impl FnHealthCheck {
    pub fn new(f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self { f: Box::new(f) }
    }
}

impl Instrument for FnHealthCheck {
    fn kind(&self) -> &'static str {
        "health_check"
    }
}

impl HealthCheck for FnHealthCheck {
    fn check(&self) -> bool {
        (self.f)()
    }
}
