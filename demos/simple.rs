use clr_typename::{parse_type_name, TypeTree, Version};

fn main() {
    let name = "System.Collections.Generic.List`1[[System.String, System.Private.CoreLib, \
Version=8.0.0.0, Culture=neutral, PublicKeyToken=7cec85d7bea7798e]], System.Private.CoreLib, \
Version=8.0.0.0, Culture=neutral, PublicKeyToken=7cec85d7bea7798e";

    let ty = match parse_type_name(name) {
        Ok(ty) => ty,
        Err(e) => {
            eprintln!("Failed to parse type name: {:?}", miette::Report::from(e));
            return;
        }
    };

    println!("Parsed {:?} type:\n{}", ty.kind(), TypeTree::from(&ty).to_json().unwrap());

    if let Some(assembly) = ty.assembly() {
        let retargeted = assembly
            .with_version(Version::with_revision(9, 0, 0, 0))
            .without_qualification("PublicKeyToken");
        println!("Retargeted assembly: {retargeted}");
    }
}
