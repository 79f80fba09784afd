//! Converter registry
//!
//! Resolution order for a type:
//!
//! 1. a converter registered for exactly that type
//! 2. the family rules, most specific family first, registration order
//!    breaking ties
//! 3. otherwise [`ConversionError::UnsupportedType`]
//!
//! A [`ConverterRegistry`] is built once and then only read. For setups
//! that add converters while calls are in flight, [`SharedRegistry`] swaps
//! whole copies so a lookup never sees a half-updated table.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::convert::{
    Converter, ListConverter, OptionalConverter, PrimitiveConverter, RecordConverter,
    StringConverter,
};
use crate::error::ConversionError;
use crate::types::{HostType, TypeFamily};

#[derive(Clone)]
struct FamilyRule {
    family: TypeFamily,
    converter: Arc<dyn Converter>,
}

#[derive(Clone, Default)]
pub struct ConverterRegistry {
    exact: HashMap<HostType, Arc<dyn Converter>>,
    families: Vec<FamilyRule>,
}

impl ConverterRegistry {
    /// An empty registry: every type is unsupported.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in converters: primitives, strings, optionals, lists, and
    /// records (outbound for any record; inbound needs a schema, see
    /// [`RecordConverter::with_schema`]).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register_family(TypeFamily::Primitive, PrimitiveConverter)
            .register(HostType::String, StringConverter)
            .register_family(TypeFamily::Optional, OptionalConverter)
            .register_family(TypeFamily::List, ListConverter)
            .register_family(TypeFamily::Record, RecordConverter::new());
        registry
    }

    /// Register a converter for exactly `ty`, replacing any previous one.
    pub fn register(&mut self, ty: HostType, converter: impl Converter + 'static) -> &mut Self {
        self.register_arc(ty, Arc::new(converter))
    }

    pub fn register_arc(&mut self, ty: HostType, converter: Arc<dyn Converter>) -> &mut Self {
        debug!(%ty, converter = converter.name(), "registering converter");
        if self.exact.insert(ty.clone(), converter).is_some() {
            debug!(%ty, "replaced existing converter");
        }
        self
    }

    /// Register a converter for every type in `family`.
    pub fn register_family(
        &mut self,
        family: TypeFamily,
        converter: impl Converter + 'static,
    ) -> &mut Self {
        self.register_family_arc(family, Arc::new(converter))
    }

    pub fn register_family_arc(
        &mut self,
        family: TypeFamily,
        converter: Arc<dyn Converter>,
    ) -> &mut Self {
        debug!(%family, converter = converter.name(), "registering family converter");
        // Keep rules sorted by specificity; equal ranks stay in registration order
        let position = self
            .families
            .iter()
            .position(|rule| rule.family.specificity() > family.specificity())
            .unwrap_or(self.families.len());
        self.families.insert(position, FamilyRule { family, converter });
        self
    }

    /// Find the converter for `ty`.
    pub fn resolve(&self, ty: &HostType) -> Result<&dyn Converter, ConversionError> {
        if let Some(converter) = self.exact.get(ty) {
            trace!(%ty, converter = converter.name(), "exact match");
            return Ok(converter.as_ref());
        }
        for rule in &self.families {
            if rule.family.contains(ty) {
                trace!(%ty, family = %rule.family, converter = rule.converter.name(), "family match");
                return Ok(rule.converter.as_ref());
            }
        }
        debug!(%ty, "no converter");
        Err(ConversionError::unsupported(ty))
    }

    pub fn supports(&self, ty: &HostType) -> bool {
        self.resolve(ty).is_ok()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let exact: Vec<String> = self.exact.keys().map(|ty| ty.to_string()).collect();
        let families: Vec<String> = self.families.iter().map(|r| r.family.to_string()).collect();
        f.debug_struct("ConverterRegistry")
            .field("exact", &exact)
            .field("families", &families)
            .finish()
    }
}

/// A registry that accepts registrations at runtime.
///
/// Readers take a [`snapshot`](SharedRegistry::snapshot) per call and keep
/// using it even if a registration lands meanwhile.
#[derive(Debug)]
pub struct SharedRegistry {
    current: RwLock<Arc<ConverterRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: ConverterRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    pub fn snapshot(&self) -> Arc<ConverterRegistry> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Copy the current table, apply `f`, and publish the copy.
    pub fn update(&self, f: impl FnOnce(&mut ConverterRegistry)) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = ConverterRegistry::clone(&current);
        f(&mut next);
        *current = Arc::new(next);
    }

    pub fn register(&self, ty: HostType, converter: impl Converter + 'static) {
        let converter: Arc<dyn Converter> = Arc::new(converter);
        self.update(|registry| {
            registry.register_arc(ty, converter);
        });
    }

    pub fn register_family(&self, family: TypeFamily, converter: impl Converter + 'static) {
        let converter: Arc<dyn Converter> = Arc::new(converter);
        self.update(|registry| {
            registry.register_family_arc(family, converter);
        });
    }
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new(ConverterRegistry::with_defaults())
    }
}
