/// Returns the unqualified name of a type, stripping module paths and generic parameters.
///
/// E.g. `short_type_name::<crate::component_client::LocalComponentClient<Req, Resp>>()` returns
/// `"LocalComponentClient"`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full_name = std::any::type_name::<T>();
    let without_generics = full_name.split('<').next().unwrap_or(full_name);
    without_generics.rsplit("::").next().unwrap_or(without_generics)
}

#[cfg(test)]
mod tests {
    use super::short_type_name;

    struct Foo;

    #[test]
    fn strips_module_path_and_generics() {
        assert_eq!(short_type_name::<Foo>(), "Foo");
        assert_eq!(short_type_name::<Vec<Foo>>(), "Vec");
    }
}
