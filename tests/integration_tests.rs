use certificados::core::packager::RenderFailurePolicy;
use certificados::domain::ports::Storage;
use certificados::utils::error::CertificateError;
use certificados::{
    CertificateConfig, CertificateEngine, CustomTextPipeline, LocalStorage, PresencePipeline,
};
use lopdf::Document;
use std::io::Read;
use tempfile::TempDir;

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn read_zip(path: &str) -> Vec<(String, Vec<u8>)> {
    let data = std::fs::read(path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes).unwrap();
            (file.name().to_string(), bytes)
        })
        .collect()
}

fn page_content(pdf: &[u8]) -> Vec<u8> {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = *doc.get_pages().values().next().unwrap();
    doc.get_page_content(page_id).unwrap()
}

fn setup(file_name: &str, content: &str) -> (TempDir, CertificateConfig) {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join(file_name);
    std::fs::write(&input, content).unwrap();

    let mut config = CertificateConfig::default();
    config.input.path = Some(input.to_str().unwrap().to_string());
    config.output.path = temp_dir.path().join("saida").to_str().unwrap().to_string();
    config.presence.issue_date = Some("14 de outubro de 2026".to_string());
    (temp_dir, config)
}

#[tokio::test]
async fn test_end_to_end_presence_archive() {
    let csv = "Full Name,E-mail,Atividade\n\
               Ana Silva,ana@example.com,Workshop A\n\
               Ana Silva,ana@example.com,Workshop A\n\
               Bruno,bruno@example.com,Curso B\n";
    let (temp_dir, mut config) = setup("presenca.csv", csv);
    config.presence.start_date = "2026-03-01".to_string();
    config.presence.end_date = "2026-06-30".to_string();

    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let engine = CertificateEngine::new(PresencePipeline::new(storage, config));
    let report = engine.run().await.unwrap();

    assert_eq!(report.certificates, 2);
    assert_eq!(report.total_hours, 6.0);

    let entries = read_zip(&report.output_path);
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Ana_Silva_certificado.pdf", "Bruno_certificado.pdf"]);

    let content = page_content(&entries[0].1);
    assert!(contains(&content, b"(Ana Silva) Tj"));
    assert!(contains(&content, b"01/03/2026"));
    assert!(contains(&content, b"(Belo Horizonte, 14 de outubro de 2026) Tj"));
}

#[tokio::test]
async fn test_end_to_end_custom_template() {
    let (temp_dir, mut config) = setup("turma.csv", "Nome,Mensagem\nAna,\nBruno,Texto especial\n");
    config.custom.template = Some("Dear {name}, congrats".to_string());
    config.custom.text_column = Some("Mensagem".to_string());
    config.custom.footer = Some("Coordenação".to_string());

    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let report = CertificateEngine::new(CustomTextPipeline::new(storage, config))
        .run()
        .await
        .unwrap();

    let entries = read_zip(&report.output_path);
    assert_eq!(entries.len(), 2);

    let ana = page_content(&entries[0].1);
    assert!(contains(&ana, b"(Dear Ana, congrats) Tj"));
    assert!(!contains(&ana, b"{name}"));

    let bruno = page_content(&entries[1].1);
    assert!(contains(&bruno, b"(Texto especial) Tj"));
    assert!(!contains(&bruno, b"Dear"));
}

#[tokio::test]
async fn test_unreadable_input_writes_no_archive() {
    let (temp_dir, config) = setup("presenca.xlsx", "this is not a workbook");
    let output_dir = config.output.path.clone();

    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let result = CertificateEngine::new(PresencePipeline::new(storage, config))
        .run()
        .await;

    assert!(matches!(result, Err(CertificateError::UnreadableTable { .. })));
    assert!(!std::path::Path::new(&output_dir).exists());
}

#[tokio::test]
async fn test_invalid_background_aborts_batch() {
    let (temp_dir, mut config) = setup("presenca.csv", "Nome Completo\nAna\n");
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    storage.write_file("fundo.png", b"not a png").await.unwrap();
    config.render.background = Some("fundo.png".to_string());
    config.batch.on_render_failure = RenderFailurePolicy::Skip;

    let result = CertificateEngine::new(PresencePipeline::new(storage, config))
        .run()
        .await;
    assert!(matches!(result, Err(CertificateError::InvalidBackground { .. })));
}

#[tokio::test]
async fn test_parallel_workers_match_sequential_order() {
    let csv: String = std::iter::once("Participante".to_string())
        .chain((0..12).map(|i| format!("Pessoa {}", i)))
        .collect::<Vec<_>>()
        .join("\n");

    let mut names = Vec::new();
    for workers in [1, 4] {
        let (temp_dir, mut config) = setup("lista.csv", &csv);
        config.batch.workers = workers;
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
        let report = CertificateEngine::new(PresencePipeline::new(storage, config))
            .run()
            .await
            .unwrap();
        names.push(
            read_zip(&report.output_path)
                .into_iter()
                .map(|(name, _)| name)
                .collect::<Vec<_>>(),
        );
    }

    assert_eq!(names[0].len(), 12);
    assert_eq!(names[0], names[1]);
    assert_eq!(names[0][11], "Pessoa_11_certificado.pdf");
}
