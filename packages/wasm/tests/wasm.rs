#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use springlink_wasm::SpringLinkWasm;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::*;

    fn editor(seed_nodes: usize) -> SpringLinkWasm {
        let config = js_sys::JSON::parse(&format!(r#"{{"seed_nodes": {seed_nodes}, "seed": 11}}"#))
            .expect("valid config json");
        SpringLinkWasm::new(config).expect("editor should start")
    }

    #[wasm_bindgen_test]
    fn test_default_config() {
        let editor = SpringLinkWasm::new(JsValue::UNDEFINED).expect("editor should start");
        assert_eq!(editor.node_count(), 5);
        assert_eq!(editor.link_count(), 4);
        assert_eq!(editor.positions().length(), 10);
    }

    #[wasm_bindgen_test]
    fn test_click_to_select_and_add() {
        let mut editor = editor(1);

        editor.pointer_down(400.0, 300.0, 0.0);
        assert!(editor.pointer_up(400.0, 300.0, 20.0).expect("click"));
        assert_eq!(editor.selected_node(), Some(0));

        editor.set_tool("add").expect("known tool");
        editor.pointer_down(600.0, 300.0, 100.0);
        assert!(editor.pointer_up(600.0, 300.0, 120.0).expect("click"));
        assert_eq!(editor.node_count(), 2);

        assert!(editor.set_tool("lasso").is_err());
        assert_eq!(editor.tool(), "add");
    }

    #[wasm_bindgen_test]
    fn test_path_and_views() {
        let mut editor = editor(1);
        let a = editor.add_node(0, Some(600.0), Some(300.0)).expect("add");
        let b = editor.add_node(a, None, None).expect("add");

        assert_eq!(editor.find_path(0, b).expect("path"), vec![0, a, b]);
        assert_eq!(editor.highlighted_path_cost(), Some(2.0));

        let nodes = editor.nodes().expect("nodes");
        assert!(js_sys::Array::is_array(&nodes));
        assert_eq!(js_sys::Array::from(&nodes).length(), 3);

        let links = js_sys::Array::from(&editor.links().expect("links"));
        assert_eq!(links.length(), 2);
    }

    #[wasm_bindgen_test]
    fn test_save_load_round_trip() {
        let mut editor = editor(6);
        let saved = editor.save().expect("save");

        editor.remove_node(1).expect("remove");
        editor.load(&saved).expect("load");
        assert_eq!(editor.save().expect("save"), saved);

        assert!(editor.load("[]").is_err());
        assert_eq!(editor.node_count(), 6);
    }
}
