use seqbias::model::{self, Model};
use seqbias::motif::Motif;

#[test]
fn save_then_load_preserves_a_learned_motif() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.yaml");

    let motif = Motif {
        l: 2,
        r: 1,
        parents: vec![Vec::new(), vec![0], Vec::new(), vec![0, 1]],
        fg_tables: vec![
            vec![0.1, 0.2, 0.3, 0.4],
            vec![0.25; 16],
            vec![0.25; 4],
            vec![0.0625; 64],
        ],
        bg_tables: vec![
            vec![0.25; 4],
            vec![0.25; 16],
            vec![0.25; 4],
            vec![0.0625; 64],
        ],
        trivial: false,
    };
    let model = Model {
        motif: motif.clone(),
        ref_path: "ref.fa".into(),
    };

    model::save(&model, &path).expect("save");
    let loaded = model::load("ref.fa", &path).expect("load");

    assert_eq!(loaded.motif, motif);
}

#[test]
fn loading_a_missing_file_is_a_missing_input_error() {
    let err = model::load("ref.fa", "/no/such/model.yaml").unwrap_err();
    assert!(err.to_string().contains("missing input"));
}
