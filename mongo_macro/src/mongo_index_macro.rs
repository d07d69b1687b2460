use quote::quote;
use syn::{parse_macro_input, Attribute, DeriveInput, Lit};

struct IndexSpec {
    fields: Vec<String>,
    unique: bool,
    order: i32,
    name: Option<String>,
}

impl IndexSpec {
    /// 未指定名称时按 MongoDB 默认规则命名，如 `username_1`
    fn index_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.fields.iter().map(|f| format!("{}_{}", f, self.order)).collect::<Vec<_>>().join("_"),
        }
    }
}

fn parse_index_attr(attr: &Attribute) -> syn::Result<IndexSpec> {
    let mut spec = IndexSpec { fields: vec![], unique: false, order: 1, name: None };
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("fields") {
            let nested;
            syn::bracketed!(nested in meta.input);
            while !nested.is_empty() {
                match nested.parse::<Lit>()? {
                    Lit::Str(lit) => spec.fields.push(lit.value()),
                    other => return Err(syn::Error::new_spanned(other, "index field must be a string literal")),
                }
                if nested.is_empty() {
                    break;
                }
                nested.parse::<syn::Token![,]>()?;
            }
        } else if meta.path.is_ident("unique") {
            spec.unique = true;
        } else if meta.path.is_ident("order") {
            let content;
            syn::parenthesized!(content in meta.input);
            let lit: syn::LitStr = content.parse()?;
            spec.order = if lit.value().eq_ignore_ascii_case("desc") { -1 } else { 1 };
        } else if meta.path.is_ident("name") {
            let content;
            syn::parenthesized!(content in meta.input);
            let lit: syn::LitStr = content.parse()?;
            spec.name = Some(lit.value());
        } else {
            return Err(meta.error("unsupported mongo_index option"));
        }
        Ok(())
    })?;
    if spec.fields.is_empty() {
        return Err(syn::Error::new_spanned(attr, "mongo_index requires at least one field"));
    }
    Ok(spec)
}

pub fn expand_index_model_provider(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let name = &ast.ident;

    let mut index_exprs = vec![];
    for attr in ast.attrs.iter().filter(|a| a.path().is_ident("mongo_index")) {
        let spec = match parse_index_attr(attr) {
            Ok(spec) => spec,
            Err(e) => return e.to_compile_error().into(),
        };
        let fields = &spec.fields;
        let orders = vec![spec.order; fields.len()];
        let unique = spec.unique;
        let index_name = spec.index_name();
        index_exprs.push(quote! {
            {
                let mut keys = ::mongodb::bson::Document::new();
                #( keys.insert(#fields, #orders); )*
                ::mongodb::IndexModel::builder()
                    .keys(keys)
                    .options(
                        ::mongodb::options::IndexOptions::builder()
                            .unique(#unique)
                            .name(#index_name.to_string())
                            .build(),
                    )
                    .build()
            }
        });
    }

    let gen = quote! {
        impl ::common::index_trait::MongoIndexModelProvider for #name {
            fn index_models() -> Vec<::mongodb::IndexModel> {
                vec![
                    #(#index_exprs),*
                ]
            }
        }
    };

    gen.into()
}
