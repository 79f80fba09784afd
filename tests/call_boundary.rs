use wirebind::{
    convert_params, convert_returns, ConversionError, ConverterRegistry, ErrorKind, FromHost,
    HostType, HostValue, MarshalConfig, TypedParameter, WireBatch,
};

fn params(types: &[HostType]) -> Vec<TypedParameter> {
    types.iter().cloned().map(TypedParameter::new).collect()
}

#[test]
fn failing_parameter_is_named() {
    let registry = ConverterRegistry::with_defaults();
    let config = MarshalConfig::default();
    let batch = WireBatch::parse_lines("c0-param0=boolean:true\nc0-param1=number:12x");

    let err = convert_params(
        &registry,
        &config,
        &batch,
        &params(&[HostType::Bool, HostType::S32]),
    )
    .unwrap_err();

    assert_eq!(err.index, 1);
    assert_eq!(err.id.as_deref(), Some("c0-param1"));
    assert_eq!(err.target, HostType::S32);
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(err.to_string(), "parameter 1 (s32): cannot parse \"12x\" as s32");
    assert_eq!(
        err.remote_message(),
        "format error in parameter 1 (declared s32): cannot parse \"12x\" as s32"
    );
}

#[test]
fn missing_parameter_is_a_mismatch() {
    let registry = ConverterRegistry::with_defaults();
    let config = MarshalConfig::default();
    let batch = WireBatch::parse_lines("c0-param0=string:only");

    let err = convert_params(
        &registry,
        &config,
        &batch,
        &params(&[HostType::String, HostType::U8]),
    )
    .unwrap_err();

    assert_eq!(err.index, 1);
    assert_eq!(err.id, None);
    assert_eq!(err.source, ConversionError::mismatch(&HostType::U8));
    assert_eq!(
        err.remote_message(),
        "type-mismatch error in parameter 1 (declared u8): value is not assignable to u8"
    );
}

#[test]
fn unsupported_parameter_type() {
    let registry = ConverterRegistry::new();
    let config = MarshalConfig::default();
    let batch = WireBatch::parse_lines("c0-param0=number:1");

    let err = convert_params(&registry, &config, &batch, &params(&[HostType::F64])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    assert_eq!(
        err.remote_message(),
        "unsupported-type error in parameter 0 (declared f64): type f64 is not supported"
    );
}

#[test]
fn extra_parameters_are_ignored() {
    let registry = ConverterRegistry::with_defaults();
    let config = MarshalConfig::default();
    let batch = WireBatch::parse_lines("c0-param0=number:7\nc0-param1=string:unused");

    let values = convert_params(&registry, &config, &batch, &params(&[HostType::U32])).unwrap();
    assert_eq!(values, vec![HostValue::U32(7)]);
}

#[test]
fn optional_parameters_accept_null() {
    let registry = ConverterRegistry::with_defaults();
    let config = MarshalConfig::default();
    let batch = WireBatch::parse_lines("c0-param0=null:null\nc0-param1=number:2.5");
    let ty = HostType::optional(HostType::F64);

    let values =
        convert_params(&registry, &config, &batch, &params(&[ty.clone(), ty])).unwrap();
    let first: Option<f64> = FromHost::from_host(values[0].clone()).unwrap();
    let second: Option<f64> = FromHost::from_host(values[1].clone()).unwrap();
    assert_eq!(first, None);
    assert_eq!(second, Some(2.5));
}

#[test]
fn response_script_layout() {
    let registry = ConverterRegistry::with_defaults();
    let config = MarshalConfig::default();

    let empty = convert_returns(&registry, &config, &[]).unwrap();
    assert_eq!(empty.to_script("done"), "done();");

    let list = HostValue::list(HostType::String, vec!["a\"b".into()]);
    let response =
        convert_returns(&registry, &config, &[HostValue::Null, list, HostValue::U8(3)]).unwrap();
    assert_eq!(response.expressions(), vec!["null", "s0", "3"]);
    assert_eq!(
        response.to_script("done"),
        "var s0=[];\ns0[0]=\"a\\\"b\";\ndone(null,s0,3);"
    );
}

#[test]
fn conversion_failure_on_return_path() {
    let registry = ConverterRegistry::with_defaults();
    let config = MarshalConfig::default();
    let mut registry_without_lists = ConverterRegistry::new();
    registry_without_lists.register(HostType::S32, wirebind::PrimitiveConverter);

    let nested = HostValue::record("Box", [("inner", HostValue::list(HostType::S32, vec![]))]);
    assert!(convert_returns(&registry, &config, std::slice::from_ref(&nested)).is_ok());
    assert_eq!(
        convert_returns(&registry_without_lists, &config, &[nested]).err(),
        Some(ConversionError::unsupported(&HostType::record("Box")))
    );
}

#[test]
fn parameters_bind_by_id_index() {
    let registry = ConverterRegistry::with_defaults();
    let config = MarshalConfig::default();
    let batch = WireBatch::parse_lines("c0-param1=string:hello\nc0-param0=number:7");

    let values = convert_params(
        &registry,
        &config,
        &batch,
        &params(&[HostType::S32, HostType::String]),
    )
    .unwrap();
    assert_eq!(
        values,
        vec![HostValue::S32(7), HostValue::String("hello".to_string())]
    );
}

#[test]
fn gap_before_a_later_parameter_is_missing() {
    let registry = ConverterRegistry::with_defaults();
    let config = MarshalConfig::default();
    let batch = WireBatch::parse_lines("c0-param1=number:5");
    let first = HostType::optional(HostType::S32);

    let err = convert_params(
        &registry,
        &config,
        &batch,
        &params(&[first.clone(), HostType::S32]),
    )
    .unwrap_err();
    assert_eq!(err.index, 0);
    assert_eq!(err.id, None);
    assert_eq!(err.source, ConversionError::mismatch(&first));
}
