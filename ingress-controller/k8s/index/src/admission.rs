use ingress_controller_core::RoutingResource;

/// Decides which routing resources this controller instance owns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Admission {
    class: String,
    strict: bool,
}

impl Admission {
    pub fn new(class: impl Into<String>, strict: bool) -> Self {
        Self {
            class: class.into(),
            strict,
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn owns(&self, resource: &RoutingResource) -> bool {
        owns(resource, &self.class, self.strict)
    }
}

/// Returns true if the resource is owned by a controller of the given class.
///
/// Resources without a class annotation are owned unless `strict` is set. An empty annotation is
/// treated as missing.
pub fn owns(resource: &RoutingResource, class: &str, strict: bool) -> bool {
    match resource.class.as_deref() {
        Some(c) => c == class,
        None => !strict,
    }
}
