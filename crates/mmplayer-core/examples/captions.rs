//! Caption parsing example
//!
//! Demonstrates parsing inline and TTML-like captions and looking up the
//! captions visible at a playback position.
//!
//! Run with: cargo run -p mmplayer-core --example captions

use mmplayer_core::captions::{InlineParser, TtmlParser};
use mmplayer_core::sync::active_captions;
use mmplayer_core::timecode::format_time;

fn main() {
    println!("MMPlayer Core - Caption Parsing Example");
    println!("=======================================\n");

    let inline = r#"<section class="transcript">
  <p class="wb-tmtxt" data-begin="0:00:00" data-dur="3s">Welcome to the <b>tour</b>.</p>
  <p class="wb-tmtxt" data-begin="0:00:03.5" data-end="0:00:07">Use the arrow keys to seek.</p>
  <p class="wb-tmtxt" data="{begin: '8s', dur: '4s'}">Relaxed data attributes work too.</p>
</section>"#;

    let captions = InlineParser::default().parse(inline);
    println!("Inline fragment: {} captions", captions.len());
    for caption in &captions {
        println!(
            "  [{} -> {}] {}",
            format_time(caption.begin()),
            format_time(caption.end()),
            caption.text()
        );
    }
    println!();

    let ttml = r#"<tt xmlns="http://www.w3.org/ns/ttml"><body><div>
  <p begin="00:01:30.00" end="00:01:33.00">Timed text line one</p>
  <p begin="93.5s" dur="2s">Timed text line two</p>
</div></body></tt>"#;

    let timed = TtmlParser.parse(ttml);
    println!("TTML document: {} captions\n", timed.len());

    println!("Captions visible at specific positions:");
    for position in [1.0, 3.2, 8.0, 91.0, 94.0] {
        let visible: Vec<&str> = active_captions(&captions, position)
            .chain(active_captions(&timed, position))
            .map(|c| c.text())
            .collect();
        println!("  {:>6.1}s: {:?}", position, visible);
    }
}
