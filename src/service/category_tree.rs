use crate::models::{CategoryNode, CategoryOption, CategoryRecord};
use indexmap::IndexMap;
use std::collections::HashSet;

/// 扁平分类列表 -> 分类森林
///
/// 1. 建立 `categoryId -> 记录` 查找表 (保序，重复ID以最后一条为准，位置取首次出现)
/// 2. 按输入顺序挂到父分类下；未声明父分类或父分类不存在时提升为根 (不报错)
/// 3. 父链成环的记录无法从根到达，取环上输入顺序最靠前的记录提升为根
///
/// 子节点顺序与输入顺序一致。每条记录在结果中恰好出现一次。
pub fn build_tree(flat: &[CategoryRecord]) -> Vec<CategoryNode> {
    let mut lookup: IndexMap<&str, &CategoryRecord> = IndexMap::with_capacity(flat.len());
    for record in flat {
        lookup.insert(record.category_id.as_str(), record);
    }

    let records: Vec<&CategoryRecord> = lookup.values().copied().collect();
    let mut parents: Vec<Option<usize>> = vec![None; records.len()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots: Vec<usize> = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        let parent_idx = record
            .parent_category
            .as_deref()
            .and_then(|parent| lookup.get_index_of(parent));

        match parent_idx {
            Some(p) => {
                parents[idx] = Some(p);
                children[p].push(idx);
            }
            None => {
                if let Some(parent) = record.parent_category.as_deref() {
                    tracing::debug!(
                        "Category {} references missing parent {}, promoted to root",
                        record.category_id,
                        parent
                    );
                }
                roots.push(idx);
            }
        }
    }

    let mut visited = vec![false; records.len()];
    let mut forest: Vec<CategoryNode> = roots
        .iter()
        .map(|&idx| materialize(idx, &records, &children, &mut visited))
        .collect();

    for idx in 0..records.len() {
        if visited[idx] {
            continue;
        }
        let entry = cycle_entry(idx, &parents);
        tracing::warn!(
            "Category {} is part of a parent cycle, promoted to root",
            records[entry].category_id
        );
        forest.push(materialize(entry, &records, &children, &mut visited));
    }

    forest
}

fn materialize(
    idx: usize,
    records: &[&CategoryRecord],
    children: &[Vec<usize>],
    visited: &mut [bool],
) -> CategoryNode {
    visited[idx] = true;
    let mut node = CategoryNode::new(records[idx].clone());
    for &child in &children[idx] {
        // 环的闭合边
        if visited[child] {
            continue;
        }
        node.sub_categories
            .push(materialize(child, records, children, visited));
    }
    node
}

/// 沿父链找到环，返回环上下标最小 (输入最靠前) 的成员
fn cycle_entry(start: usize, parents: &[Option<usize>]) -> usize {
    let mut seen = HashSet::new();
    let mut current = start;
    while seen.insert(current) {
        match parents[current] {
            Some(p) => current = p,
            None => return start,
        }
    }

    let mut entry = current;
    let mut member = current;
    while let Some(p) = parents[member] {
        if p == current {
            break;
        }
        entry = entry.min(p);
        member = p;
    }
    entry
}

/// 先序遍历展开为下拉选项 (用于选择父分类)
pub fn flatten_options(forest: &[CategoryNode]) -> Vec<CategoryOption> {
    fn walk(nodes: &[CategoryNode], depth: usize, out: &mut Vec<CategoryOption>) {
        for node in nodes {
            let indent = "--".repeat(depth);
            let label = if depth == 0 {
                node.record.name.clone()
            } else {
                format!("{} {}", indent, node.record.name)
            };
            out.push(CategoryOption {
                category_id: node.record.category_id.clone(),
                name: node.record.name.clone(),
                depth,
                label,
            });
            walk(&node.sub_categories, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(forest, 0, &mut out);
    out
}

/// 递归查找分类
pub fn find_category<'a>(forest: &'a [CategoryNode], category_id: &str) -> Option<&'a CategoryNode> {
    for node in forest {
        if node.id() == category_id {
            return Some(node);
        }
        if let Some(found) = find_category(&node.sub_categories, category_id) {
            return Some(found);
        }
    }
    None
}

/// 森林中的节点总数
pub fn count_nodes(forest: &[CategoryNode]) -> usize {
    forest
        .iter()
        .map(|node| 1 + count_nodes(&node.sub_categories))
        .sum()
}
