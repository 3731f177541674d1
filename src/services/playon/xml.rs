// XML documents served by PlayOn.
//
// Catalog documents are a root element with `group` children:
//
//   <catalog type="folder" name="PlayOn" href="/data/data.xml" apiVersion="1" server="3.10">
//     <group type="folder" name="Random TV Network" href="/data/data.xml?id=rtv" searchable="true"/>
//   </catalog>
//
// Video detail documents carry one child element per field:
//
//   <group type="video" name="Episode 1" href="/data/data.xml?id=ep1">
//     <series name="Random Series"/>
//     <media_title name="Random Series - s01e01 - Pilot"/>
//     <time name="00:22:00"/>
//     <media_playlater name="PlayLater" src="/playlater/queue?id=ep1"/>
//   </group>

use super::PlayOnError;
use crate::models::{CatalogItem, Folder, Video, VideoDetails};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(super) struct GroupNode {
    #[serde(rename = "@type", default)]
    pub kind: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@href", default)]
    pub href: String,
    #[serde(rename = "@searchable", default)]
    pub searchable: Option<String>,
    #[serde(rename = "@apiVersion", default)]
    pub api_version: Option<String>,
    #[serde(rename = "@server", default)]
    pub server: Option<String>,

    #[serde(rename = "group", default)]
    pub groups: Vec<GroupNode>,

    #[serde(default)]
    pub media: Option<SourceNode>,
    #[serde(default)]
    pub media_playlater: Option<SourceNode>,
    #[serde(default)]
    pub date: Option<NamedNode>,
    #[serde(default)]
    pub description: Option<NamedNode>,
    #[serde(default)]
    pub media_title: Option<NamedNode>,
    #[serde(default)]
    pub time: Option<NamedNode>,
    #[serde(default)]
    pub series: Option<NamedNode>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct NamedNode {
    #[serde(rename = "@name", default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SourceNode {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@src", default)]
    pub src: String,
    #[serde(rename = "@art", default)]
    pub art: String,
}

/// `<result><status>true</status><msg>...</msg></result>`
#[derive(Debug, Default, Deserialize)]
pub(super) struct QueueResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub msg: String,
}

pub(super) fn parse_group(body: &str) -> Result<GroupNode, PlayOnError> {
    Ok(quick_xml::de::from_str(body)?)
}

pub(super) fn parse_queue_response(body: &str) -> Result<QueueResponse, PlayOnError> {
    Ok(quick_xml::de::from_str(body)?)
}

fn named(node: &Option<NamedNode>) -> String {
    node.as_ref().map(|n| n.name.clone()).unwrap_or_default()
}

impl GroupNode {
    fn has_detail_nodes(&self) -> bool {
        self.media.is_some()
            || self.media_playlater.is_some()
            || self.date.is_some()
            || self.description.is_some()
            || self.media_title.is_some()
            || self.time.is_some()
            || self.series.is_some()
    }

    /// Convert into a catalog item. Folders that already list their children
    /// keep them; all others are fetched lazily.
    pub fn into_item(self) -> Result<CatalogItem, PlayOnError> {
        match self.kind.as_str() {
            "folder" => Ok(CatalogItem::Folder(self.into_folder()?)),
            "video" => Ok(CatalogItem::Video(Video::new(self.name, self.href))),
            other => Err(PlayOnError::UnhandledNodeType(other.to_string())),
        }
    }

    pub fn into_folder(self) -> Result<Folder, PlayOnError> {
        let searchable = self
            .searchable
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");

        let folder = if self.groups.is_empty() {
            Folder::new(self.name, self.href)
        } else {
            let children = self
                .groups
                .into_iter()
                .map(GroupNode::into_item)
                .collect::<Result<Vec<_>, _>>()?;
            Folder::with_children(self.name, self.href, children)
        };
        Ok(folder.searchable(searchable))
    }

    pub fn into_children(self) -> Result<Vec<CatalogItem>, PlayOnError> {
        self.groups.into_iter().map(GroupNode::into_item).collect()
    }

    pub fn into_details(self) -> VideoDetails {
        if !self.has_detail_nodes() {
            return VideoDetails::default();
        }
        let media = self.media.unwrap_or_default();
        let play_later = self.media_playlater.unwrap_or_default();
        VideoDetails {
            series: named(&self.series),
            media_title: named(&self.media_title),
            run_time: named(&self.time),
            description: named(&self.description),
            air_date: named(&self.date),
            art_url_large: media.art,
            media_url: media.src,
            play_later_name: play_later.name,
            play_later_url: play_later.src,
        }
    }
}
