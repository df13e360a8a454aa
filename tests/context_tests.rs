use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;
use wordcloud_tool::config::Config;
use wordcloud_tool::extract::{DocumentExtractor, PageFetcher, PdfTextExtractor};
use wordcloud_tool::render::{ChartRenderer, CloudRenderer};
use wordcloud_tool::{
    AppContext, CloudOptions, Error, FrequencyMap, LoadOptions, ParserConfig, RasterImage, Result,
    Source,
};

mod test_helpers {
    use super::*;

    pub fn file_with(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    pub struct FakeOcr {
        pub output: &'static str,
        pub calls: Mutex<usize>,
    }

    impl DocumentExtractor for FakeOcr {
        fn extract(&self, _path: &Path) -> Result<Vec<u8>> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.output.as_bytes().to_vec())
        }
    }

    pub fn fake_ocr(output: &'static str) -> Arc<FakeOcr> {
        Arc::new(FakeOcr {
            output,
            calls: Mutex::new(0),
        })
    }

    pub struct FakePages(pub Vec<&'static str>);

    impl PdfTextExtractor for FakePages {
        fn pages(&self, _path: &Path) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|p| p.to_string()).collect())
        }
    }

    pub struct FakeFetcher(pub &'static str);

    impl PageFetcher for FakeFetcher {
        fn get(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    pub type Rendered = Arc<Mutex<Vec<(String, u64)>>>;

    /// Records what each renderer was asked to draw.
    pub struct RecordingCloud(pub Rendered);

    impl CloudRenderer for RecordingCloud {
        fn render(&self, words: &FrequencyMap, options: &CloudOptions) -> Result<RasterImage> {
            *self.0.lock().unwrap() = words.iter().map(|(w, c)| (w.to_string(), c)).collect();
            Ok(RasterImage {
                width: options.width,
                height: options.height,
                png: Vec::new(),
            })
        }
    }

    pub struct RecordingChart(pub Rendered);

    impl ChartRenderer for RecordingChart {
        fn render_bars(&self, labels: &[String], counts: &[u64]) -> Result<RasterImage> {
            *self.0.lock().unwrap() = labels.iter().cloned().zip(counts.iter().copied()).collect();
            Ok(RasterImage {
                width: 1,
                height: 1,
                png: Vec::new(),
            })
        }
    }

    /// A context whose stop words are exactly "the" and "and", with no external tools.
    pub struct Fixture {
        pub ctx: AppContext,
        pub ocr: Arc<FakeOcr>,
        pub documents: Arc<FakeOcr>,
        pub cloud: Rendered,
        pub chart: Rendered,
        _stopfile: NamedTempFile,
    }

    pub fn fixture(pages: Vec<&'static str>) -> Fixture {
        let stopfile = file_with(b"the\nand\n");
        let config = Config {
            stopfile: Some(stopfile.path().display().to_string()),
            freq_size: 2,
            ..Config::default()
        };
        let ocr = fake_ocr("scanned invoice total");
        let documents = fake_ocr("quarterly board minutes");
        let cloud: Rendered = Arc::default();
        let chart: Rendered = Arc::default();
        let ctx = AppContext::new(&config)
            .unwrap()
            .with_ocr(ocr.clone())
            .with_documents(documents.clone())
            .with_pdf_text(Arc::new(FakePages(pages)))
            .with_fetcher(Arc::new(FakeFetcher("<p>Remote data engineer</p>")))
            .with_renderers(
                Box::new(RecordingCloud(cloud.clone())),
                Box::new(RecordingChart(chart.clone())),
            );
        Fixture {
            ctx,
            ocr,
            documents,
            cloud,
            chart,
            _stopfile: stopfile,
        }
    }

    pub fn pruned() -> LoadOptions {
        LoadOptions {
            parser: ParserConfig::default(),
            prune: true,
        }
    }

    pub fn raw() -> LoadOptions {
        LoadOptions {
            parser: ParserConfig::default(),
            prune: false,
        }
    }

    pub fn pairs(items: &[(&str, u64)]) -> Vec<(String, u64)> {
        items.iter().map(|(w, c)| (w.to_string(), *c)).collect()
    }
}

use test_helpers::*;

// Loading words

#[cfg(test)]
mod load_tests {
    use super::*;

    #[test]
    fn test_stopfile_from_config_is_loaded() {
        let fx = fixture(vec![]);
        assert_eq!(fx.ctx.stopwords().get_alphabetic_stopwords(), vec!["and", "the"]);
    }

    #[test]
    fn test_missing_stopfile_fails_setup() {
        let config = Config {
            stopfile: Some("no/such/stopfile.txt".to_string()),
            ..Config::default()
        };
        assert!(matches!(AppContext::new(&config), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_pasted_text_is_pruned_with_context_stopwords() {
        let mut fx = fixture(vec![]);
        let source = Source::Pasted("The cat and the dog's bowl".to_string());
        let added = fx.ctx.load(&source, &pruned()).unwrap();
        assert_eq!(added, 3);
        let expected: FrequencyMap = [("cat", 1), ("dog", 1), ("bowl", 1)].into_iter().collect();
        assert_eq!(fx.ctx.words().get_word_count(), &expected);
    }

    #[test]
    fn test_parser_stopwords_take_precedence() {
        let fx = fixture(vec![]);
        let options = LoadOptions {
            parser: ParserConfig::default().with_stopwords(["cat"]),
            prune: true,
        };
        let tokens = fx
            .ctx
            .extract(&Source::Pasted("cat dog the".to_string()), &options)
            .unwrap();
        assert_eq!(tokens, vec!["dog", "the"]);
    }

    #[test]
    fn test_unpruned_load_counts_everything_lowercased() {
        let mut fx = fixture(vec![]);
        fx.ctx
            .load(&Source::Pasted("The cat and THE dog".to_string()), &raw())
            .unwrap();
        assert_eq!(fx.ctx.words().get_word_count().get("the"), Some(2));
        assert_eq!(fx.ctx.words().get_word_count().total(), 5);
    }

    #[test]
    fn test_loads_accumulate_until_new_session() {
        let mut fx = fixture(vec![]);
        fx.ctx.load(&Source::Pasted("cat dog".to_string()), &pruned()).unwrap();
        fx.ctx.load(&Source::Pasted("cat".to_string()), &pruned()).unwrap();
        assert_eq!(fx.ctx.words().get_word_count().get("cat"), Some(2));

        fx.ctx.new_session();
        assert!(fx.ctx.words().get_word_count().is_empty());
    }

    #[test]
    fn test_web_page_markup_stripping() {
        let fx = fixture(vec![]);
        let source = Source::WebPage {
            url: "http://example.test/job".to_string(),
            strip_markup: true,
        };
        assert_eq!(
            fx.ctx.extract(&source, &raw()).unwrap(),
            vec!["Remote", "data", "engineer"]
        );
    }

    #[test]
    fn test_word_documents_use_the_document_extractor() {
        let fx = fixture(vec![]);
        let doc = file_with(b"PK\x03\x04");
        let tokens = fx
            .ctx
            .extract(&Source::WordDocument(doc.path().to_path_buf()), &raw())
            .unwrap();
        assert_eq!(tokens, vec!["quarterly", "board", "minutes"]);
        assert_eq!(*fx.documents.calls.lock().unwrap(), 1);
        assert_eq!(*fx.ocr.calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_image_files_use_ocr() {
        let fx = fixture(vec![]);
        let image = file_with(b"\x89PNG\r\n\x1a\n");
        let tokens = fx
            .ctx
            .extract(&Source::ImageFile(image.path().to_path_buf()), &raw())
            .unwrap();
        assert_eq!(tokens, vec!["scanned", "invoice", "total"]);
        assert_eq!(*fx.documents.calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_failed_load_leaves_session_untouched() {
        let mut fx = fixture(vec![]);
        let err = fx
            .ctx
            .load(&Source::TextFile("missing.txt".into()), &pruned())
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
        assert!(fx.ctx.words().get_word_count().is_empty());
    }
}

// PDF text with OCR fallback

#[cfg(test)]
mod pdf_fallback_tests {
    use super::*;

    #[test]
    fn test_text_layer_is_used_when_present() {
        let fx = fixture(vec!["quarterly revenue"]);
        let pdf = file_with(b"%PDF-1.7\n");
        let tokens = fx
            .ctx
            .extract(&Source::PdfText(pdf.path().to_path_buf()), &raw())
            .unwrap();
        assert_eq!(tokens, vec!["quarterly", "revenue"]);
        assert_eq!(*fx.ocr.calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_empty_text_layer_falls_back_to_ocr() {
        let fx = fixture(vec!["", "  "]);
        let pdf = file_with(b"%PDF-1.7\n");
        let tokens = fx
            .ctx
            .extract(&Source::PdfText(pdf.path().to_path_buf()), &raw())
            .unwrap();
        assert_eq!(tokens, vec!["scanned", "invoice", "total"]);
        assert_eq!(*fx.ocr.calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_fallback_output_is_pruned() {
        let fx = fixture(vec![]);
        let pdf = file_with(b"%PDF-1.7\n");
        let tokens = fx
            .ctx
            .extract(
                &Source::PdfText(pdf.path().to_path_buf()),
                &LoadOptions {
                    parser: ParserConfig::default().with_min_word_length(6),
                    prune: true,
                },
            )
            .unwrap();
        assert_eq!(tokens, vec!["scanned", "invoice"]);
    }

    #[test]
    fn test_other_sources_do_not_fall_back() {
        let fx = fixture(vec![]);
        let empty = file_with(b"");
        let tokens = fx
            .ctx
            .extract(&Source::TextFile(empty.path().to_path_buf()), &raw())
            .unwrap();
        assert!(tokens.is_empty());
        assert_eq!(*fx.ocr.calls.lock().unwrap(), 0);
    }
}

// Visualization

#[cfg(test)]
mod visualize_tests {
    use super::*;

    #[test]
    fn test_stop_words_are_excluded_from_both_images() {
        let mut fx = fixture(vec![]);
        fx.ctx
            .load(
                &Source::Pasted("the cat the dog and the cat bird".to_string()),
                &raw(),
            )
            .unwrap();
        fx.ctx.visualize().unwrap();

        assert_eq!(
            *fx.cloud.lock().unwrap(),
            pairs(&[("cat", 2), ("dog", 1), ("bird", 1)])
        );
        assert_eq!(*fx.chart.lock().unwrap(), pairs(&[("cat", 2), ("dog", 1)]));
        assert!(fx.ctx.generator().get_cloud_image().is_some());
        assert!(fx.ctx.generator().generated_at().is_some());
    }

    #[test]
    fn test_stop_word_changes_apply_on_next_visualize() {
        let mut fx = fixture(vec![]);
        fx.ctx
            .load(&Source::Pasted("cat cat dog bird".to_string()), &raw())
            .unwrap();
        fx.ctx.stopwords_mut().add_stopword("cat").unwrap();
        fx.ctx.visualize().unwrap();
        assert_eq!(*fx.chart.lock().unwrap(), pairs(&[("dog", 1), ("bird", 1)]));
        // counts themselves are untouched
        assert_eq!(fx.ctx.words().get_word_count().get("cat"), Some(2));
    }

    #[test]
    fn test_image_observers_run_before_chart_observers() {
        let mut fx = fixture(vec![]);
        let order = Arc::new(Mutex::new(Vec::new()));
        let (chart_log, image_log) = (order.clone(), order.clone());
        fx.ctx
            .generator_mut()
            .subscribe_chart(move |_| chart_log.lock().unwrap().push("chart"));
        fx.ctx
            .generator_mut()
            .subscribe_image(move |g| {
                assert!(g.get_frequency_image().is_some());
                image_log.lock().unwrap().push("image")
            });

        fx.ctx.load(&Source::Pasted("cat dog".to_string()), &raw()).unwrap();
        fx.ctx.visualize().unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["image", "chart"]);
    }

    #[test]
    fn test_empty_session_still_renders() {
        let mut fx = fixture(vec![]);
        fx.ctx.visualize().unwrap();
        assert!(fx.cloud.lock().unwrap().is_empty());
        assert!(fx.chart.lock().unwrap().is_empty());
        assert!(fx.ctx.generator().get_frequency_image().is_some());
    }

    #[test]
    fn test_default_renderers_produce_png() {
        let stopfile = file_with(b"the\n");
        let config = Config {
            width: 120,
            height: 90,
            stopfile: Some(stopfile.path().display().to_string()),
            ..Config::default()
        };
        let mut ctx = AppContext::new(&config).unwrap();
        ctx.load(&Source::Pasted("cat cat dog".to_string()), &raw()).unwrap();
        ctx.visualize().unwrap();

        let cloud = ctx.generator().get_cloud_image().unwrap();
        assert_eq!((cloud.width, cloud.height), (120, 90));
        assert_eq!(&cloud.png[1..4], b"PNG");
        let chart = ctx.generator().get_frequency_image().unwrap();
        assert_eq!(&chart.png[1..4], b"PNG");
    }
}
