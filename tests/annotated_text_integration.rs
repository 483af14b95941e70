use annotext::{AnnotatedText, ByteRange};

fn append_pair(tag: &str, gap: &str, first: &str, second: &str) -> AnnotatedText {
    let mut text = AnnotatedText::default();
    text.set_target_language(tag);
    text.append_sentence("", &[first]);
    text.append_sentence(gap, &[second]);
    text
}

/// Without a target language the gap is copied verbatim
#[test]
fn test_untagged_gap_is_verbatim() {
    let text = append_pair("", " ", "Hello.", "World.");
    assert_eq!(text.text(), "Hello. World.");
    assert_eq!(text.gap(1), " ");

    let text = append_pair("", "", "A.", "B.");
    assert_eq!(text.text(), "A.B.", "no space is invented without a tag");
}

#[test]
fn test_japanese_drops_inter_sentence_space() {
    let text = append_pair("ja", " ", "こんにちは。", "さようなら。");
    assert_eq!(text.text(), "こんにちは。さようなら。");
    assert_eq!(text.sentence(1), "さようなら。");
    assert_eq!(text.gap(1), "");
}

#[test]
fn test_cjk_keeps_markup_in_gap() {
    let text = append_pair("ja", "</b> ", "A", "B");
    assert_eq!(text.text(), "A</b>B");

    let text = append_pair("zh-Hans", " <i> x </i> ", "A", "B");
    assert_eq!(text.text(), "A<i></i>B");
}

#[test]
fn test_cjk_drops_unterminated_tag() {
    let text = append_pair("ko", " <br> <b", "A", "B");
    assert_eq!(text.text(), "A<br>B");
}

#[test]
fn test_english_synthesizes_space() {
    let text = append_pair("en", "", "A.", "B.");
    assert_eq!(text.text(), "A. B.");
    assert_eq!(text.gap(1), " ");
    assert_eq!(text.sentence(0), "A.");
    assert_eq!(text.sentence(1), "B.");
}

#[test]
fn test_newline_survives_every_policy() {
    for tag in ["", "en", "ja", "zh"] {
        let text = append_pair(tag, "\n", "A", "B");
        assert_eq!(text.text(), "A\nB", "tag {tag:?}");
    }
    let text = append_pair("ja", " \n ", "A", "B");
    assert_eq!(text.text(), "A \n B");
}

#[test]
fn test_first_sentence_gets_no_synthesized_space() {
    let mut text = AnnotatedText::default();
    text.set_target_language("en");
    text.append_sentence("", &["Hi", "."]);
    assert_eq!(text.text(), "Hi.");
    assert_eq!(text.gap(0), "");
}

#[test]
fn test_index_arrays_stay_consistent() {
    let mut text = AnnotatedText::default();
    text.set_target_language("en");
    text.append_sentence("  ", &["One", " two", "."]);
    text.append_sentence("", &["Three", "."]);
    text.append_ending_whitespace("\n");

    let token_begin = text.annotation().token_begin();
    assert_eq!(token_begin.first(), Some(&0));
    assert_eq!(token_begin.last(), Some(&text.text().len()));
    assert!(token_begin.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(text.annotation().gaps().len(), text.num_sentences());

    let mut rebuilt = String::new();
    for s in 0..text.num_sentences() {
        rebuilt.push_str(text.gap(s));
        for w in 0..text.num_words(s) {
            rebuilt.push_str(text.word(s, w));
        }
    }
    rebuilt.push_str(text.gap(text.num_sentences()));
    assert_eq!(rebuilt, "  One two. Three.\n");
    assert_eq!(rebuilt, text.text());
}

#[test]
fn test_recorded_sentences_view_owned_buffer() {
    let mut text = AnnotatedText::new("<p>Ein Satz. Noch einer.</p>".to_string());
    text.record_existing_sentence(
        &[ByteRange::new(3, 6), ByteRange::new(6, 11), ByteRange::new(11, 12), ByteRange::empty_at(12)],
        3,
    );
    text.record_existing_sentence(
        &[ByteRange::new(13, 17), ByteRange::new(17, 23), ByteRange::new(23, 24), ByteRange::empty_at(24)],
        13,
    );

    assert_eq!(text.gap(0), "<p>");
    assert_eq!(text.sentence(0), "Ein Satz.");
    assert_eq!(text.gap(1), " ");
    assert_eq!(text.sentence(1), "Noch einer.");
    assert_eq!(text.word(1, 1), " einer");
    assert_eq!(text.gap(2), "</p>");
    assert_eq!(text.gap_as_byte_range(2), ByteRange::new(24, 28));
}

#[test]
#[should_panic(expected = "starts before the previous sentence ends")]
fn test_record_rejects_overlapping_sentence() {
    let mut text = AnnotatedText::new("abcdef".to_string());
    text.record_existing_sentence(&[ByteRange::new(0, 4)], 0);
    text.record_existing_sentence(&[ByteRange::new(2, 5)], 2);
}

#[test]
fn test_assemble_target_for_cjk() {
    let mut source = AnnotatedText::new("Guten Tag. Wie geht's?\n".to_string());
    source.record_existing_sentence(&[ByteRange::new(0, 10), ByteRange::empty_at(10)], 0);
    source.record_existing_sentence(&[ByteRange::new(11, 22), ByteRange::empty_at(22)], 11);

    let target = AnnotatedText::assemble_target(
        &source,
        &[vec!["こんにちは", "。"], vec!["お元気", "ですか", "？"]],
        "ja",
    );
    assert_eq!(target.text(), "こんにちは。お元気ですか？\n");
    assert_eq!(target.num_sentences(), 2);
    assert_eq!(target.num_words(1), 3);
    assert_eq!(target.word(1, 1), "ですか");
    assert_eq!(target.target_language(), Some("ja"));
}
