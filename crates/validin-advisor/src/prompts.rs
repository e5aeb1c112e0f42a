//! Indonesian prompt templates

use validin_core::{Label, Verdict};

const HOAX_INSTRUCTIONS: &str = "\
1. Penjelasan singkat mengapa berita ini berpotensi hoax
2. 3 langkah verifikasi yang dapat dilakukan pembaca
3. Saran untuk tidak menyebarkan informasi yang belum terverifikasi
4. Rekomendasi sumber berita terpercaya di Indonesia";

const VALID_INSTRUCTIONS: &str = "\
1. Penjelasan singkat mengapa berita ini tampak valid
2. Tetap berikan 3 tips untuk selalu memverifikasi berita, meskipun sudah terdeteksi valid
3. Pentingnya tetap berpikir kritis dalam mengonsumsi berita
4. Saran untuk berbagi informasi secara bertanggung jawab";

/// First `max_chars` characters of the article followed by `...`
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut preview: String = text.chars().take(max_chars).collect();
    preview.push_str("...");
    preview
}

/// Build the guidance request for a classified article
pub fn build_prompt(text: &str, verdict: &Verdict, preview_chars: usize) -> String {
    let instructions = match verdict.label {
        Label::Hoax => HOAX_INSTRUCTIONS,
        Label::Valid => VALID_INSTRUCTIONS,
    };

    format!(
        "Berdasarkan analisis AI, berita berikut terdeteksi sebagai {} dengan tingkat kepercayaan {:.2}%.\n\
         \n\
         Berita: \"{}\"\n\
         \n\
         Sebagai asisten AI yang membantu literasi digital, berikan:\n\
         {}\n\
         \n\
         Berikan dalam format yang mudah dibaca dan informatif dalam bahasa Indonesia.",
        verdict.label,
        verdict.confidence,
        preview(text, preview_chars),
        instructions
    )
}
