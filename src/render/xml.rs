// src/render/xml.rs
// =============================================================================
// Writes a PageNode tree as an indented XML document:
//
//   <node>
//     <url>https://example.com/</url>
//     <nodes>
//       <node>
//         <url>https://example.com/about</url>
//         <nodes/>
//       </node>
//     </nodes>
//   </node>
//
// quick-xml takes care of indentation and of escaping '&' and '<' in URLs.
// =============================================================================

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

use crate::crawl::PageNode;
use crate::error::RenderError;

pub fn render_xml(root: &PageNode) -> Result<String, RenderError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_node(&mut writer, root)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &PageNode) -> Result<(), RenderError> {
    writer.write_event(Event::Start(BytesStart::new("node")))?;

    writer.write_event(Event::Start(BytesStart::new("url")))?;
    writer.write_event(Event::Text(BytesText::new(&node.url)))?;
    writer.write_event(Event::End(BytesEnd::new("url")))?;

    if node.children.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("nodes")))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new("nodes")))?;
        for child in &node.children {
            write_node(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new("nodes")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("node")))?;
    Ok(())
}
