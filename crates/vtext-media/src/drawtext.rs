//! FFmpeg filter graph generation for render plans.
//!
//! Each cue becomes one or two `drawtext` filters whose `x`/`y`/`alpha`
//! options are piecewise-linear expressions of `t`, gated by `enable`.
//! Cue text is passed through `textfile` so newlines and quotes survive
//! untouched.

use std::path::{Path, PathBuf};
use vtext_models::Color;

use crate::animation::Motion;
use crate::compose::{bold_emphasis, OverlayCue, RenderPlan};

/// Label of the graph's video output.
pub const OUTPUT_LABEL: &str = "vout";

/// Horizontal shear applied to emulate italics.
pub const ITALIC_SHEAR: f64 = -0.2;

/// A filter script plus the text files it references.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    pub script: String,
    /// `(path, contents)` for each cue's text file
    pub text_files: Vec<(PathBuf, String)>,
}

/// Build the filter graph for `plan`, placing cue text files under `text_dir`.
pub fn build_filter_graph(plan: &RenderPlan, text_dir: &Path) -> FilterGraph {
    if plan.cues.is_empty() {
        return FilterGraph {
            script: format!("[0:v]null[{}]", OUTPUT_LABEL),
            text_files: Vec::new(),
        };
    }

    let mut text_files = Vec::with_capacity(plan.cues.len());
    let mut filters = Vec::new();
    for (i, cue) in plan.cues.iter().enumerate() {
        let path = text_dir.join(format!("cue_{:04}.txt", i));
        filters.extend(drawtext_passes(plan, cue, &path));
        text_files.push((path, cue.text.clone()));
    }
    let chain = filters.join(",\n");

    let script = if plan.font.synthetic_italic {
        // Draw on a transparent canvas, shear it, then lay it over the video.
        format!(
            "color=c=black@0.0:s={}x{}:r={}:d={},format=rgba[canvas];\n\
             [canvas]{},\nshear=shx={}:shy=0:fillcolor=none[text];\n\
             [0:v][text]overlay=0:0:shortest=1:format=auto[{}]",
            plan.frame.width.round() as i64,
            plan.frame.height.round() as i64,
            num(plan.fps),
            num(plan.duration + 1.0),
            chain,
            ITALIC_SHEAR,
            OUTPUT_LABEL
        )
    } else {
        format!("[0:v]{}[{}]", chain, OUTPUT_LABEL)
    };

    FilterGraph { script, text_files }
}

/// Escape a value for use inside single quotes in a filter graph.
fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "'\\''")
}

fn quoted_path(path: &Path) -> String {
    format!("'{}'", escape_filter_value(&path.to_string_lossy()))
}

/// Format a number for an expression; negatives are parenthesized.
fn num(v: f64) -> String {
    let v = if v == 0.0 { 0.0 } else { v };
    if v < 0.0 {
        format!("({:.3})", v)
    } else {
        format!("{:.3}", v)
    }
}

/// Expression for one axis of `motion`, offset by `inset`.
fn axis_expr(from: f64, to: f64, motion: &Motion, inset: f64) -> String {
    let from = from + inset;
    let to = to + inset;
    if motion.duration <= 0.0 || from == to {
        return num(to);
    }
    let end = motion.origin + motion.duration;
    format!(
        "if(lt(t,{o}),{from},if(lt(t,{e}),{from}+{delta}*(t-{o})/{d},{to}))",
        o = num(motion.origin),
        e = num(end),
        d = num(motion.duration),
        from = num(from),
        to = num(to),
        delta = num(to - from),
    )
}

fn alpha_expr(motion: &Motion) -> Option<String> {
    if !motion.fade_in || motion.duration <= 0.0 {
        return None;
    }
    Some(format!(
        "if(lt(t,{o}),0,if(lt(t,{e}),(t-{o})/{d},1))",
        o = num(motion.origin),
        e = num(motion.origin + motion.duration),
        d = num(motion.duration),
    ))
}

struct Layers {
    border: Option<(u32, Color)>,
    shadow: bool,
    background: bool,
}

fn drawtext_passes(plan: &RenderPlan, cue: &OverlayCue, text_file: &Path) -> Vec<String> {
    let style = &plan.style;
    let outline = style.outline.map(|o| (o.width, o.color));

    let passes = if plan.font.synthetic_bold {
        let emphasis = bold_emphasis(style.size);
        match outline {
            // Outline pass underneath, fill-colored emphasis on top.
            Some((width, color)) => vec![
                Layers {
                    border: Some((width + emphasis, color)),
                    shadow: true,
                    background: true,
                },
                Layers {
                    border: Some((emphasis, style.fill)),
                    shadow: false,
                    background: false,
                },
            ],
            None => vec![Layers {
                border: Some((emphasis, style.fill)),
                shadow: true,
                background: true,
            }],
        }
    } else {
        vec![Layers {
            border: outline,
            shadow: true,
            background: true,
        }]
    };

    passes
        .iter()
        .map(|layers| drawtext_filter(plan, cue, text_file, layers))
        .collect()
}

fn drawtext_filter(
    plan: &RenderPlan,
    cue: &OverlayCue,
    text_file: &Path,
    layers: &Layers,
) -> String {
    let style = &plan.style;
    let motion = &cue.motion;
    let mut opts = vec![
        format!("fontfile={}", quoted_path(&plan.font.path)),
        format!("textfile={}", quoted_path(text_file)),
        "expansion=none".to_string(),
        format!("fontsize={}", style.size),
        format!("fontcolor={}", style.fill.to_ffmpeg(1.0)),
    ];

    if let Some((width, color)) = layers.border {
        opts.push(format!("borderw={}", width));
        opts.push(format!("bordercolor={}", color.to_ffmpeg(1.0)));
    }
    if let Some(shadow) = style.shadow.filter(|_| layers.shadow) {
        opts.push(format!("shadowx={}", shadow.dx));
        opts.push(format!("shadowy={}", shadow.dy));
        opts.push(format!("shadowcolor={}", shadow.color.to_ffmpeg(shadow.opacity)));
    }
    if let Some(background) = style.background.filter(|_| layers.background) {
        opts.push("box=1".to_string());
        opts.push(format!("boxcolor={}", background.color.to_ffmpeg(background.opacity)));
        opts.push(format!("boxborderw={}", background.padding));
    }

    opts.push(format!("x='{}'", axis_expr(motion.start.x, motion.rest.x, motion, plan.inset)));
    opts.push(format!("y='{}'", axis_expr(motion.start.y, motion.rest.y, motion, plan.inset)));
    if let Some(alpha) = alpha_expr(motion) {
        opts.push(format!("alpha='{}'", alpha));
    }
    opts.push(format!(
        "enable='gte(t,{})*lt(t,{})'",
        num(cue.start),
        num(cue.end)
    ));

    format!("drawtext={}", opts.join(":"))
}
