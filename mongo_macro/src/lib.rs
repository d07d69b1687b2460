extern crate proc_macro;

mod mongo_index_macro;

use proc_macro::TokenStream;

/// 根据 `#[mongo_index(fields["a", "b"], unique, order("desc"), name("uk_x"))]`
/// 生成 `common::index_trait::MongoIndexModelProvider` 实现，一个属性对应一个索引
#[proc_macro_derive(MongoIndexModelProvider, attributes(mongo_index))]
pub fn mongo_index_model_provider(input: TokenStream) -> TokenStream {
    mongo_index_macro::expand_index_model_provider(input)
}
