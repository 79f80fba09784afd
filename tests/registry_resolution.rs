use std::sync::Arc;

use wirebind::{
    convert_returns, ConversionError, Converter, ConverterRegistry, HostType, HostValue,
    InboundContext, MarshalConfig, OutboundContext, OutboundVariable, SharedRegistry, TypeFamily,
    WireBatch, WireValue,
};

/// Converts everything to a fixed marker, so tests can see which converter ran.
struct Tagged(&'static str);

impl Converter for Tagged {
    fn name(&self) -> &'static str {
        self.0
    }

    fn convert_inbound(
        &self,
        _target: &HostType,
        _data: &WireValue,
        _ctx: &mut InboundContext<'_>,
    ) -> Result<HostValue, ConversionError> {
        Ok(HostValue::String(self.0.to_string()))
    }

    fn convert_outbound(
        &self,
        _data: &HostValue,
        _ctx: &mut OutboundContext<'_>,
    ) -> Result<OutboundVariable, ConversionError> {
        Ok(OutboundVariable::leaf(self.0))
    }
}

fn chosen(registry: &ConverterRegistry, ty: &HostType) -> &'static str {
    registry.resolve(ty).map(|c| c.name()).unwrap_or("none")
}

#[test]
fn exact_beats_family_in_any_order() {
    let mut family_first = ConverterRegistry::new();
    family_first
        .register_family(TypeFamily::Integer, Tagged("family"))
        .register(HostType::S32, Tagged("exact"));

    let mut exact_first = ConverterRegistry::new();
    exact_first
        .register(HostType::S32, Tagged("exact"))
        .register_family(TypeFamily::Integer, Tagged("family"));

    for registry in [&family_first, &exact_first] {
        assert_eq!(chosen(registry, &HostType::S32), "exact");
        assert_eq!(chosen(registry, &HostType::U8), "family");
    }
}

#[test]
fn narrower_family_wins() {
    let mut registry = ConverterRegistry::new();
    registry
        .register_family(TypeFamily::Primitive, Tagged("primitive"))
        .register_family(TypeFamily::Numeric, Tagged("numeric"))
        .register_family(TypeFamily::Integer, Tagged("integer"))
        .register_family(TypeFamily::Any, Tagged("any"));

    assert_eq!(chosen(&registry, &HostType::S64), "integer");
    assert_eq!(chosen(&registry, &HostType::F32), "numeric");
    assert_eq!(chosen(&registry, &HostType::Bool), "primitive");
    assert_eq!(chosen(&registry, &HostType::String), "any");
    assert_eq!(chosen(&registry, &HostType::record("X")), "any");
}

#[test]
fn equal_rank_keeps_registration_order() {
    let mut registry = ConverterRegistry::new();
    registry
        .register_family(TypeFamily::Integer, Tagged("first"))
        .register_family(TypeFamily::Integer, Tagged("second"));

    assert_eq!(chosen(&registry, &HostType::U16), "first");
}

#[test]
fn exact_registration_replaces() {
    let mut registry = ConverterRegistry::new();
    registry
        .register(HostType::Bool, Tagged("old"))
        .register(HostType::Bool, Tagged("new"));

    assert_eq!(chosen(&registry, &HostType::Bool), "new");
}

#[test]
fn empty_registry_supports_nothing() {
    let registry = ConverterRegistry::new();
    let ty = HostType::list(HostType::S32);

    assert!(!registry.supports(&ty));
    assert_eq!(
        registry.resolve(&ty).err(),
        Some(ConversionError::unsupported(&ty))
    );
}

#[test]
fn defaults_cover_the_builtin_types() {
    let registry = ConverterRegistry::with_defaults();
    for ty in [
        HostType::Bool,
        HostType::Char,
        HostType::U64,
        HostType::F64,
        HostType::String,
        HostType::optional(HostType::S8),
        HostType::list(HostType::list(HostType::String)),
        HostType::record("Anything"),
    ] {
        assert!(registry.supports(&ty), "{}", ty);
    }
}

#[test]
fn custom_converter_runs_in_both_directions() {
    let mut registry = ConverterRegistry::with_defaults();
    registry.register(HostType::Bool, Tagged("yes"));
    let config = MarshalConfig::default();

    let batch = WireBatch::new();
    let mut inbound = InboundContext::new(&registry, &config, &batch);
    assert_eq!(
        inbound.convert(&WireValue::parse("boolean:false"), &HostType::Bool),
        Ok(HostValue::String("yes".to_string()))
    );

    let response = convert_returns(&registry, &config, &[HostValue::Bool(false)]).unwrap();
    assert_eq!(response.to_script("f"), "f(yes);");
}

#[test]
fn unsupported_runtime_type_is_reported() {
    let registry = ConverterRegistry::new();
    let config = MarshalConfig::default();

    assert_eq!(
        convert_returns(&registry, &config, &[HostValue::F32(1.0)]).err(),
        Some(ConversionError::unsupported(&HostType::F32))
    );
}

#[test]
fn snapshot_ignores_later_registrations() {
    let shared = SharedRegistry::default();
    let before = shared.snapshot();

    shared.register(HostType::S32, Tagged("late"));
    let after = shared.snapshot();

    assert_eq!(chosen(&before, &HostType::S32), "primitive");
    assert_eq!(chosen(&after, &HostType::S32), "late");
    assert!(!Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn concurrent_calls_share_one_registry() {
    let shared = Arc::new(SharedRegistry::default());
    let config = Arc::new(MarshalConfig::default());

    let mut handles = Vec::new();
    for i in 0..8 {
        let shared = Arc::clone(&shared);
        let config = Arc::clone(&config);
        handles.push(tokio::task::spawn_blocking(move || {
            let registry = shared.snapshot();
            let list = HostValue::list(HostType::S32, vec![HostValue::S32(i)]);
            let response = convert_returns(&registry, &config, &[list.clone(), list]).unwrap();
            (i, response.to_script("cb"))
        }));
    }

    shared.register_family(TypeFamily::Float, Tagged("float"));

    for handle in handles {
        let (i, script) = handle.await.unwrap();
        assert_eq!(script, format!("var s0=[];\ns0[0]={};\ncb(s0,s0);", i));
    }
    assert_eq!(chosen(&shared.snapshot(), &HostType::F64), "float");
}
