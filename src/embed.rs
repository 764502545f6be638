//! Audio embedding into the generated slide markup.
//!
//! Pure string transform: inserts an autoplaying, looping audio element
//! plus a small playback script before the first `</body>`. Playback is
//! wired to a click fallback and to Reveal's `ready` and `slidechanged`
//! events. Markup without a closing body tag passes through unchanged.

const CLOSING_BODY: &str = "</body>";

/// Insert the background-audio block into `markup`, referencing the
/// audio asset by `audio_filename`.
pub fn embed_audio(markup: &str, audio_filename: &str) -> String {
    if !markup.contains(CLOSING_BODY) {
        return markup.to_string();
    }

    let snippet = format!(
        r#"
    <audio id="background-audio" loop autoplay>
        <source src="{audio_filename}" type="audio/mpeg">
        Your browser does not support the audio element.
    </audio>
    <script>
        const audio = document.getElementById('background-audio');
        document.addEventListener('click', () => {{
            if (audio.paused) {{
                audio.play();
            }}
        }});
        Reveal.on('ready', () => {{
            if (audio.paused) {{
                audio.play().catch((err) => {{
                    console.log('Autoplay blocked. Audio will play after user interaction.');
                }});
            }}
        }});
        Reveal.on('slidechanged', () => {{
            if (audio.paused) {{
                audio.play();
            }}
        }});
    </script>
    "#
    );

    markup.replacen(CLOSING_BODY, &format!("{snippet}\n{CLOSING_BODY}"), 1)
}
