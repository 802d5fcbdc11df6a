use crate::config::Config;
use crate::graph::GraphNode;
use crate::label::FrameResult;
use crate::theme::Theme;

/// Render one frame of the graph as an SVG document. The world origin
/// sits at the canvas center and everything inside the group is in
/// graph coordinates, with font sizes divided back out so labels keep
/// a constant on-screen size across zoom levels.
pub fn render_svg(
    nodes: &[GraphNode],
    links: &[(usize, usize)],
    frame: &FrameResult,
    global_scale: f32,
    theme: &Theme,
    config: &Config,
    debug_overlay: bool,
) -> String {
    let width = config.render.width;
    let height = config.render.height;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<g transform=\"translate({:.2} {:.2}) scale({global_scale})\">",
        width / 2.0,
        height / 2.0
    ));

    for &(source, target) in links {
        let Some(a) = nodes.get(source) else { continue };
        let Some(b) = nodes.get(target) else { continue };
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
            a.x,
            a.y,
            b.x,
            b.y,
            theme.link_color,
            1.0 / global_scale
        ));
    }

    for node in nodes {
        let radius = node.radius(&config.node);
        let fill = node
            .color
            .as_deref()
            .unwrap_or(theme.node_fallback_color.as_str());
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
            node.x, node.y, radius, fill
        ));
    }

    for rect in &frame.label_rects {
        if !frame.visible_nodes.contains(&rect.id) {
            continue;
        }
        svg.push_str(&label_svg(rect, global_scale, theme, config));
    }

    if debug_overlay {
        for rect in &frame.label_rects {
            let stroke = if rect.collides {
                &theme.debug_colliding
            } else {
                &theme.debug_clear
            };
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
                rect.rect.x,
                rect.rect.y,
                rect.rect.width,
                rect.rect.height,
                stroke,
                1.0 / global_scale
            ));
        }
    }

    svg.push_str("</g>");
    svg.push_str("</svg>");
    svg
}

fn label_svg(
    rect: &crate::label::LabelRect,
    global_scale: f32,
    theme: &Theme,
    config: &Config,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" fill=\"{}\"/>",
        rect.rect.x,
        rect.rect.y,
        rect.rect.width,
        rect.rect.height,
        2.0 / global_scale,
        theme.label_background
    ));

    let font_size = config.label.font_size / global_scale;
    let line_height = config.label.line_height / global_scale;
    let first_line_y = rect.rect.y + rect.debug.top_padding + font_size;
    let center_x = rect.rect.x + rect.rect.width / 2.0;
    out.push_str(&format!(
        "<text x=\"{center_x:.2}\" y=\"{first_line_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{font_size:.2}\" fill=\"{}\">",
        config.label.font_family, theme.label_text
    ));
    // The resolver sized the rect around these exact lines; painting
    // them unmodified keeps text and box in agreement.
    for (idx, line) in rect.lines.iter().enumerate() {
        if idx == 0 {
            out.push_str(&format!(
                "<tspan x=\"{center_x:.2}\" dy=\"0\">{}",
                escape_xml(line)
            ));
        } else {
            out.push_str(&format!(
                "<tspan x=\"{center_x:.2}\" dy=\"{line_height:.2}\">{}",
                escape_xml(line)
            ));
        }
        out.push_str("</tspan>");
    }
    out.push_str("</text>");
    out
}

/// Cap a title at `max_chars` characters for compact surfaces such as
/// hover text, appending an ellipsis when anything was cut. Painted
/// labels never go through this; they draw the wrapped lines the
/// resolver measured. Counts characters, not bytes.
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let cut: String = title.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
